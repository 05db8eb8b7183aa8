//! Cart commands.
//!
//! ```bash
//! cartwheel cart add 12
//! cartwheel cart inc 12
//! cartwheel cart dec 12
//! cartwheel cart show
//! cartwheel cart clear
//! ```

use clap::Subcommand;

use cartwheel_core::ProductId;
use cartwheel_shop::db::RepositoryError;
use cartwheel_shop::error::{AppError, add_breadcrumb};
use cartwheel_shop::lifetime::ScreenScope;
use cartwheel_shop::models::{DecrementOutcome, NewCartLine, subtotal};
use cartwheel_shop::state::AppState;

use super::{money, say};

#[derive(Subcommand)]
pub enum CartAction {
    /// Add one unit of a catalog product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Increase a line's quantity by one
    Inc {
        /// Product ID
        id: ProductId,
    },
    /// Decrease a line's quantity by one, removing it at zero
    Dec {
        /// Product ID
        id: ProductId,
    },
    /// Show the cart and its total
    Show,
    /// Remove every line
    Clear,
}

/// Run a cart command.
///
/// # Errors
///
/// Returns `AppError::NotFound` for a product that is not in the catalog or
/// the cart, or an error if the store fails.
pub async fn run(state: &AppState, scope: &ScreenScope, action: CartAction) -> Result<(), AppError> {
    let cart = state.cart();
    match action {
        CartAction::Add { id } => {
            let product = scope
                .run(state.catalog().product(id))
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Product {id}")))?;

            let outcome = scope.run(cart.add(&NewCartLine::from(&product))).await??;
            let product_id = id.to_string();
            add_breadcrumb("cart", outcome.message(), Some(&[("product_id", product_id.as_str())]));
            say(outcome.message());
        }
        CartAction::Inc { id } => {
            scope
                .run(cart.increment(id))
                .await?
                .map_err(|e| not_in_cart(e, id))?;
            say("Quantity increased");
        }
        CartAction::Dec { id } => {
            let outcome = scope
                .run(cart.decrement(id))
                .await?
                .map_err(|e| not_in_cart(e, id))?;
            say(match outcome {
                DecrementOutcome::Decremented => "Quantity decreased",
                DecrementOutcome::Removed => "Item removed from cart",
            });
        }
        CartAction::Show => {
            let lines = scope.run(cart.list()).await??;
            if lines.is_empty() {
                say("Your cart is empty.");
                return Ok(());
            }
            for line in &lines {
                say(&format!(
                    "{:>5}  {:<40}  {} x {:<3}  {}",
                    line.id,
                    line.title,
                    money(line.price),
                    line.quantity,
                    money(line.line_total())
                ));
            }
            say(&format!("Total: {}", money(subtotal(&lines))));
        }
        CartAction::Clear => {
            let removed = scope.run(cart.clear()).await??;
            say(&format!("Removed {removed} line(s)."));
        }
    }
    Ok(())
}

fn not_in_cart(e: RepositoryError, id: ProductId) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound(format!("Product {id} in cart")),
        other => other.into(),
    }
}
