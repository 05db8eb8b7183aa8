//! Local snapshot of the catalog.
//!
//! The last fetched listing is written with `INSERT OR REPLACE`, so the table
//! always holds the most recent copy of every product seen. Nested fields
//! (images, tags, reviews, dimensions, meta) are stored as JSON text.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, instrument};

use super::{RepositoryError, SqlParam, Store, decimal_column, optional_decimal_column};
use crate::catalog::Product;

const UPSERT_SQL: &str = "INSERT OR REPLACE INTO products (\
    id, title, description, price, thumbnail, availability_status, brand, category, \
    dimensions, discount_percentage, images, meta, minimum_order_quantity, rating, \
    return_policy, reviews, shipping_information, sku, stock, tags, \
    warranty_information, weight\
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Repository for the product snapshot.
pub struct ProductRepository<'a> {
    store: &'a Store,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert or replace every product. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn upsert_many(&self, products: &[Product]) -> Result<u64, RepositoryError> {
        let mut written = 0;
        for product in products {
            written += self.store.execute(UPSERT_SQL, &upsert_params(product)?).await?;
        }
        debug!(written, "Product snapshot saved");
        Ok(written)
    }

    /// Every stored product, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = self
            .store
            .fetch_all("SELECT * FROM products ORDER BY id", &[])
            .await?;
        rows.iter().map(product_from_row).collect()
    }
}

fn upsert_params(p: &Product) -> Result<Vec<SqlParam>, RepositoryError> {
    Ok(vec![
        p.id.as_i64().into(),
        p.title.as_str().into(),
        p.description.as_str().into(),
        p.price.into(),
        p.thumbnail.as_str().into(),
        p.availability_status.clone().into(),
        p.brand.clone().into(),
        p.category.clone().into(),
        json_param(p.dimensions.as_ref())?,
        p.discount_percentage.into(),
        json_param(Some(&p.images))?,
        json_param(p.meta.as_ref())?,
        p.minimum_order_quantity.map(i64::from).into(),
        p.rating.into(),
        p.return_policy.clone().into(),
        json_param(Some(&p.reviews))?,
        p.shipping_information.clone().into(),
        p.sku.clone().into(),
        p.stock.map(i64::from).into(),
        json_param(Some(&p.tags))?,
        p.warranty_information.clone().into(),
        p.weight.into(),
    ])
}

fn json_param<T: Serialize>(value: Option<&T>) -> Result<SqlParam, RepositoryError> {
    value
        .map(|v| {
            serde_json::to_string(v)
                .map(SqlParam::Text)
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
        })
        .transpose()
        .map(SqlParam::from)
}

fn json_column<T: DeserializeOwned>(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<T>, RepositoryError> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| {
        serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid JSON in {column}: {e}"))
        })
    })
    .transpose()
}

fn u32_column(row: &SqliteRow, column: &str) -> Result<Option<u32>, RepositoryError> {
    let raw: Option<i64> = row.try_get(column)?;
    raw.map(|v| {
        u32::try_from(v)
            .map_err(|_| RepositoryError::DataCorruption(format!("invalid {column}: {v}")))
    })
    .transpose()
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        price: decimal_column(row, "price")?,
        thumbnail: row.try_get::<Option<String>, _>("thumbnail")?.unwrap_or_default(),
        images: json_column(row, "images")?.unwrap_or_default(),
        brand: row.try_get("brand")?,
        category: row.try_get("category")?,
        rating: row.try_get("rating")?,
        stock: u32_column(row, "stock")?,
        discount_percentage: optional_decimal_column(row, "discount_percentage")?,
        tags: json_column(row, "tags")?.unwrap_or_default(),
        reviews: json_column(row, "reviews")?.unwrap_or_default(),
        dimensions: json_column(row, "dimensions")?,
        shipping_information: row.try_get("shipping_information")?,
        return_policy: row.try_get("return_policy")?,
        warranty_information: row.try_get("warranty_information")?,
        minimum_order_quantity: u32_column(row, "minimum_order_quantity")?,
        availability_status: row.try_get("availability_status")?,
        sku: row.try_get("sku")?,
        weight: row.try_get("weight")?,
        meta: json_column(row, "meta")?,
    })
}
