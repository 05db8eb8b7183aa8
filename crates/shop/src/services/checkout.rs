//! Checkout.
//!
//! Placing an order copies every cart line into `orders` under one new order
//! ID and empties the cart, in a single transaction.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use cartwheel_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::db::{RepositoryError, Store};
use crate::models::cart::CartLine;
use crate::models::order::DeliveryDetails;
use crate::models::user::User;

/// Errors that can occur at checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

static LAST_ORDER_ID: AtomicI64 = AtomicI64::new(0);

/// A millisecond timestamp, bumped past the previous ID when two orders land
/// in the same millisecond.
#[must_use]
pub fn next_order_id() -> OrderId {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_ORDER_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    OrderId::new(now.max(previous + 1))
}

/// Checkout service.
pub struct CheckoutService<'a> {
    store: &'a Store,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Turn `lines` into an order for `user` and clear the cart.
    ///
    /// Either every line is recorded and the cart is emptied, or nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if `lines` is empty (the store is
    /// not touched). Returns `CheckoutError::Repository` if the transaction
    /// fails; it is rolled back.
    #[instrument(skip_all, fields(user = %user.username, lines = lines.len()))]
    pub async fn place_order(
        &self,
        lines: &[CartLine],
        user: &User,
        delivery: &DeliveryDetails,
    ) -> Result<OrderId, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order_id = next_order_id();
        let mut tx = self.store.pool().begin().await?;

        OrderRepository::insert_in_tx(&mut tx, order_id, &user.username, delivery, lines).await?;
        sqlx::query("DELETE FROM cart").execute(&mut *tx).await?;

        tx.commit().await?;

        info!(order_id = %order_id, "Order placed");
        Ok(order_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use cartwheel_core::{Email, ProductId, SubscriptionType, UserId};

    use super::*;
    use crate::db::cart::CartRepository;
    use crate::models::cart::NewCartLine;

    fn user() -> User {
        User {
            id: UserId::new(1),
            username: "ana".into(),
            email: Email::parse("ana@example.com").unwrap(),
            subscription_type: SubscriptionType::Weekend,
            subscription_days: None,
        }
    }

    #[test]
    fn test_order_ids_strictly_increase() {
        let ids: Vec<_> = (0..100).map(|_| next_order_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let store = Store::in_memory().await.unwrap();
        let err = CheckoutService::new(&store)
            .place_order(&[], &user(), &DeliveryDetails::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_place_order_moves_cart_into_orders() {
        let store = Store::in_memory().await.unwrap();
        let cart = CartRepository::new(&store);
        for id in 1..=2 {
            cart.add(&NewCartLine {
                id: ProductId::new(id),
                title: format!("Product {id}"),
                price: Decimal::from(id * 10),
                thumbnail: String::new(),
                photo: String::new(),
                discount: None,
            })
            .await
            .unwrap();
        }
        cart.increment(ProductId::new(2)).await.unwrap();

        let lines = cart.list().await.unwrap();
        let order_id = CheckoutService::new(&store)
            .place_order(&lines, &user(), &DeliveryDetails::default())
            .await
            .unwrap();

        assert!(cart.list().await.unwrap().is_empty());

        let orders = OrderRepository::new(&store).list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, order_id);
        assert_eq!(orders[0].user_name, "ana");
        assert_eq!(orders[0].total(), Decimal::from(50));
    }
}
