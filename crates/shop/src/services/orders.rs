//! Order summary shown before checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cartwheel_core::SubscriptionType;

use crate::db::cart::CartRepository;
use crate::db::{RepositoryError, Store};
use crate::models::cart::CartLine;
use crate::models::user::User;
use crate::pricing::{Quote, additional_rate, compute_total};

/// Cart contents priced for the signed-in shopper.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    /// Lines being ordered.
    pub lines: Vec<CartLine>,
    /// Shopper's plan, if signed in.
    pub subscription: Option<SubscriptionType>,
    /// Priced totals.
    pub quote: Quote,
}

impl OrderSummary {
    /// The flat additional discount, as a whole percentage.
    #[must_use]
    pub fn additional_percent(&self) -> Decimal {
        (additional_rate() * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Order summary service.
pub struct OrderService<'a> {
    cart: CartRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            cart: CartRepository::new(store),
        }
    }

    /// Price the current cart for delivery on `delivery`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cart cannot be read.
    pub async fn summary(
        &self,
        user: Option<&User>,
        delivery: DateTime<Utc>,
        today: DateTime<Utc>,
    ) -> Result<OrderSummary, RepositoryError> {
        let lines = self.cart.list().await?;
        let quote = compute_total(&lines, user, delivery, today);
        Ok(OrderSummary {
            lines,
            subscription: user.map(|u| u.subscription_type),
            quote,
        })
    }
}
