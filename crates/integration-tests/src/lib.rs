//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```
//!
//! Every test gets a private in-memory SQLite store, an in-memory session and
//! a catalog client pointed at a closed local port, so no test touches the
//! network or the filesystem.
//!
//! # Test Files
//!
//! - `cart` - Cart add/increment/decrement behaviour
//! - `checkout` - Order placement, listing and cancellation
//! - `auth` - Registration, login and the session
//! - `pricing` - Discount rules over a real cart

use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;

use cartwheel_core::{ProductId, SubscriptionDays, SubscriptionType};
use cartwheel_shop::catalog::CatalogClient;
use cartwheel_shop::config::{CatalogConfig, DatabaseConfig, ShopConfig};
use cartwheel_shop::db::Store;
use cartwheel_shop::models::{NewCartLine, User};
use cartwheel_shop::services::auth::{AuthError, Registration};
use cartwheel_shop::session::SessionStore;
use cartwheel_shop::state::AppState;

/// Fully wired application state over throwaway backends.
pub struct TestContext {
    pub state: AppState,
}

impl TestContext {
    /// Build a fresh context.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store cannot be created.
    #[allow(clippy::unwrap_used)]
    pub async fn new() -> Self {
        let catalog_config = CatalogConfig {
            timeout: Duration::from_secs(2),
            ..CatalogConfig::with_base_url("http://127.0.0.1:9").unwrap()
        };
        let config = ShopConfig {
            database: DatabaseConfig {
                url: SecretString::from("sqlite::memory:".to_owned()),
                max_connections: 1,
                reset_orders_on_launch: false,
            },
            catalog: catalog_config.clone(),
            session_path: std::env::temp_dir().join("cartwheel-unused-session.json"),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let store = Store::in_memory().await.unwrap();
        let catalog = CatalogClient::new(&catalog_config).unwrap();
        let state = AppState::new(config, store, catalog, SessionStore::in_memory());
        Self { state }
    }

    /// Register a shopper with the given plan length.
    ///
    /// # Errors
    ///
    /// Returns the registration error, if any.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        days: Option<u32>,
    ) -> Result<User, AuthError> {
        self.state
            .auth()
            .register(&Registration {
                username: email.split('@').next().unwrap_or(email).to_owned(),
                email: email.to_owned(),
                password: SecretString::from(password.to_owned()),
                subscription_type: SubscriptionType::Weekdays,
                subscription_days: days.map(SubscriptionDays::new),
            })
            .await
    }
}

/// A product as it would be copied into the cart.
#[must_use]
pub fn product(id: i64, price: Decimal, discount: Option<Decimal>) -> NewCartLine {
    NewCartLine {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price,
        thumbnail: format!("https://cdn.example.com/{id}/thumbnail.png"),
        photo: format!("https://cdn.example.com/{id}/1.png"),
        discount,
    }
}
