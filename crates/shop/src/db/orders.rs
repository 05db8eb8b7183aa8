//! Order repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};
use tracing::{info, instrument};

use cartwheel_core::OrderId;

use super::{RepositoryError, Store, decimal_column};
use crate::models::cart::CartLine;
use crate::models::order::{DeliveryDetails, Order, OrderLine};

/// Repository for order operations.
pub struct OrderRepository<'a> {
    store: &'a Store,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert one order row per cart line inside an open transaction.
    ///
    /// `product_price` is the line's unit price and `total_price` is
    /// `price × quantity`. Nothing is visible until the caller commits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn insert_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        order_id: OrderId,
        user_name: &str,
        delivery: &DeliveryDetails,
        lines: &[CartLine],
    ) -> Result<(), RepositoryError> {
        let latitude = delivery.location.map(|c| c.latitude);
        let longitude = delivery.location.map(|c| c.longitude);

        for line in lines {
            sqlx::query(
                "INSERT INTO orders (order_id, user_name, address, city, postal_code, \
                 latitude, longitude, product_name, product_price, total_price) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(user_name)
            .bind(&delivery.address)
            .bind(&delivery.city)
            .bind(&delivery.postal_code)
            .bind(latitude)
            .bind(longitude)
            .bind(&line.title)
            .bind(line.price.to_string())
            .bind(line.line_total().to_string())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Every order row, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_lines(&self) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, order_id, user_name, address, city, postal_code, latitude, longitude, \
             product_name, product_price, total_price FROM orders ORDER BY order_id, id",
        )
        .fetch_all(self.store.pool())
        .await?;

        rows.iter().map(order_line_from_row).collect()
    }

    /// Order rows grouped by order ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(Order::group(self.list_lines().await?))
    }

    /// Delete every row of an order. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row carries `order_id`.
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(self.store.pool())
            .await?;

        match result.rows_affected() {
            0 => Err(RepositoryError::NotFound),
            removed => {
                info!(removed, "Order cancelled");
                Ok(removed)
            }
        }
    }
}

fn order_line_from_row(row: &SqliteRow) -> Result<OrderLine, RepositoryError> {
    Ok(OrderLine {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        user_name: row.try_get("user_name")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        postal_code: row.try_get("postal_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        product_name: row.try_get("product_name")?,
        product_price: decimal_column(row, "product_price")?,
        total_price: decimal_column(row, "total_price")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use cartwheel_core::ProductId;

    use super::*;
    use crate::models::order::Coordinates;

    fn line(id: i64, price: Decimal, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            quantity,
            thumbnail: String::new(),
            photo: String::new(),
            discount: None,
        }
    }

    fn delivery() -> DeliveryDetails {
        DeliveryDetails {
            address: "1 Main St".into(),
            city: "Pune".into(),
            postal_code: "411001".into(),
            location: Some(Coordinates {
                latitude: 18.52,
                longitude: 73.85,
            }),
        }
    }

    async fn insert(store: &Store, order_id: i64, lines: &[CartLine]) {
        let mut tx = store.pool().begin().await.unwrap();
        OrderRepository::insert_in_tx(&mut tx, OrderId::new(order_id), "ana", &delivery(), lines)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_records_unit_and_line_totals() {
        let store = Store::in_memory().await.unwrap();
        insert(&store, 100, &[line(1, Decimal::new(250, 2), 4)]).await;

        let lines = OrderRepository::new(&store).list_lines().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_price, Decimal::new(250, 2));
        assert_eq!(lines[0].total_price, Decimal::from(10));
        assert_eq!(lines[0].latitude, Some(18.52));
    }

    #[tokio::test]
    async fn test_uncommitted_insert_is_discarded() {
        let store = Store::in_memory().await.unwrap();
        {
            let mut tx = store.pool().begin().await.unwrap();
            OrderRepository::insert_in_tx(
                &mut tx,
                OrderId::new(1),
                "ana",
                &delivery(),
                &[line(1, Decimal::ONE, 1)],
            )
            .await
            .unwrap();
        }

        assert!(OrderRepository::new(&store).list_lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_removes_whole_order() {
        let store = Store::in_memory().await.unwrap();
        insert(&store, 1, &[line(1, Decimal::ONE, 1), line(2, Decimal::ONE, 2)]).await;
        insert(&store, 2, &[line(3, Decimal::ONE, 1)]).await;

        let repo = OrderRepository::new(&store);
        assert_eq!(repo.list_orders().await.unwrap().len(), 2);

        assert_eq!(repo.cancel(OrderId::new(1)).await.unwrap(), 2);

        let orders = repo.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_id, OrderId::new(2));

        assert!(matches!(
            repo.cancel(OrderId::new(1)).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
