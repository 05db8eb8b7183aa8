//! Store initialisation.
//!
//! ```bash
//! cartwheel init
//! ```
//!
//! Opening the application state already creates any missing tables; this
//! command reports what the store holds.

use cartwheel_shop::db::products::ProductRepository;
use cartwheel_shop::error::AppError;
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::state::AppState;

use super::say;

/// Report the state of the local store.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn run(state: &AppState, scope: &ScreenScope) -> Result<(), AppError> {
    scope
        .run(async {
            let cart = state.cart().list().await?;
            let orders = state.orders().list_orders().await?;
            let products = ProductRepository::new(state.store()).list().await?;

            say("Store ready.");
            say(&format!("  cart lines:        {}", cart.len()));
            say(&format!("  orders:            {}", orders.len()));
            say(&format!("  products snapshot: {}", products.len()));
            if state.config().database.reset_orders_on_launch {
                say("  order history is reset on every launch");
            }
            Ok::<_, AppError>(())
        })
        .await?
}
