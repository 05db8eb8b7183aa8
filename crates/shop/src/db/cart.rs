//! Cart repository.
//!
//! The cart is keyed by product ID. Adding a product that is already present
//! bumps its quantity instead of creating a second line, and decrementing a
//! line at quantity 1 removes it.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{info, instrument};

use cartwheel_core::ProductId;

use super::{RepositoryError, Store, decimal_column, optional_decimal_column};
use crate::models::cart::{AddOutcome, CartLine, DecrementOutcome, NewCartLine};

/// Repository for cart operations.
pub struct CartRepository<'a> {
    store: &'a Store,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Add one unit of a product.
    ///
    /// Inserts a line with quantity 1 if the product is absent, otherwise
    /// increments the existing line. Product fields are only copied on insert.
    /// A single upsert, so concurrent adds of one product never collide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self, line), fields(product_id = %line.id))]
    pub async fn add(&self, line: &NewCartLine) -> Result<AddOutcome, RepositoryError> {
        let quantity: i64 = sqlx::query_scalar(
            "INSERT INTO cart (id, title, price, quantity, thumbnail, photo, discount) \
             VALUES (?, ?, ?, 1, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET quantity = quantity + 1 \
             RETURNING quantity",
        )
        .bind(line.id)
        .bind(&line.title)
        .bind(line.price.to_string())
        .bind(&line.thumbnail)
        .bind(&line.photo)
        .bind(line.discount.map(|d| d.to_string()))
        .fetch_one(self.store.pool())
        .await?;

        // Stored quantities are at least 1, so only a fresh insert returns 1.
        let outcome = if quantity == 1 {
            AddOutcome::Added
        } else {
            AddOutcome::QuantityIncreased
        };

        info!(?outcome, quantity, "Cart updated");
        Ok(outcome)
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart SET quantity = quantity + 1 WHERE id = ?")
            .bind(id)
            .execute(self.store.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Decrease a line's quantity by one, removing it when it would reach 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` if the transaction fails.
    #[instrument(skip(self))]
    pub async fn decrement(&self, id: ProductId) -> Result<DecrementOutcome, RepositoryError> {
        let mut tx = self.store.pool().begin().await?;

        let quantity: i64 = sqlx::query_scalar("SELECT quantity FROM cart WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let outcome = if quantity > 1 {
            sqlx::query("UPDATE cart SET quantity = quantity - 1 WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            DecrementOutcome::Decremented
        } else {
            sqlx::query("DELETE FROM cart WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            DecrementOutcome::Removed
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// All cart lines, ordered by product ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, title, price, quantity, thumbnail, photo, discount FROM cart ORDER BY id",
        )
        .fetch_all(self.store.pool())
        .await?;

        rows.iter().map(cart_line_from_row).collect()
    }

    /// Remove every line. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart")
            .execute(self.store.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

fn cart_line_from_row(row: &SqliteRow) -> Result<CartLine, RepositoryError> {
    let quantity: i64 = row.try_get("quantity")?;
    let quantity = u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| RepositoryError::DataCorruption(format!("invalid quantity: {quantity}")))?;

    Ok(CartLine {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        price: decimal_column(row, "price")?,
        quantity,
        thumbnail: row.try_get("thumbnail")?,
        photo: row.try_get("photo")?,
        discount: optional_decimal_column(row, "discount")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;
    use crate::config::DatabaseConfig;

    fn product(id: i64, price: Decimal) -> NewCartLine {
        NewCartLine {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            thumbnail: format!("https://cdn.example.com/{id}/thumb.png"),
            photo: format!("https://cdn.example.com/{id}/1.png"),
            discount: Some(Decimal::new(12, 2)),
        }
    }

    #[tokio::test]
    async fn test_add_then_add_again_increments() {
        let store = Store::in_memory().await.unwrap();
        let repo = CartRepository::new(&store);

        assert_eq!(
            repo.add(&product(1, Decimal::new(999, 2))).await.unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            repo.add(&product(1, Decimal::new(999, 2))).await.unwrap(),
            AddOutcome::QuantityIncreased
        );

        let lines = repo.list().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, Decimal::new(999, 2));
        assert_eq!(lines[0].discount, Some(Decimal::new(12, 2)));
    }

    #[tokio::test]
    async fn test_decrement_removes_at_one() {
        let store = Store::in_memory().await.unwrap();
        let repo = CartRepository::new(&store);
        let id = ProductId::new(7);

        repo.add(&product(7, Decimal::from(10))).await.unwrap();
        repo.increment(id).await.unwrap();

        assert_eq!(repo.decrement(id).await.unwrap(), DecrementOutcome::Decremented);
        assert_eq!(repo.list().await.unwrap()[0].quantity, 1);

        assert_eq!(repo.decrement(id).await.unwrap(), DecrementOutcome::Removed);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_line_is_not_found() {
        let store = Store::in_memory().await.unwrap();
        let repo = CartRepository::new(&store);

        assert!(matches!(
            repo.increment(ProductId::new(3)).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.decrement(ProductId::new(3)).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_id_and_clear() {
        let store = Store::in_memory().await.unwrap();
        let repo = CartRepository::new(&store);

        repo.add(&product(5, Decimal::ONE)).await.unwrap();
        repo.add(&product(2, Decimal::ONE)).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![ProductId::new(2), ProductId::new(5)]);

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_adds_share_one_line() {
        let path = std::env::temp_dir().join(format!("cartwheel-cart-{}.db", std::process::id()));
        let config = DatabaseConfig {
            url: SecretString::from(format!("sqlite://{}", path.display())),
            max_connections: 4,
            reset_orders_on_launch: false,
        };
        let _ = std::fs::remove_file(&path);
        let store = Store::open(&config).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                CartRepository::new(&store)
                    .add(&product(4, Decimal::from(3)))
                    .await
                    .unwrap()
            }));
        }
        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.unwrap());
        }

        let lines = CartRepository::new(&store).list().await.unwrap();
        store.pool().close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 8);
        assert_eq!(
            outcomes.iter().filter(|o| **o == AddOutcome::Added).count(),
            1
        );
    }
}
