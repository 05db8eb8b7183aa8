//! Local SQLite store.
//!
//! # Tables
//!
//! - `users` - Registered shoppers
//! - `products` - Snapshot of the last catalog listing
//! - `cart` - One row per product in the cart
//! - `orders` - One row per purchased cart line, grouped by `order_id`
//!
//! The store is opened once per process and handed to every repository as a
//! [`Store`] handle. Schema setup is idempotent; see [`schema`].

pub mod cart;
pub mod orders;
pub mod products;
pub mod schema;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::DatabaseConfig;
pub use schema::TableDef;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A positional statement parameter for [`Store::execute`] and
/// [`Store::fetch_all`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// SQL `NULL`.
    Null,
    /// 64-bit integer.
    Integer(i64),
    /// Floating-point value.
    Real(f64),
    /// Text, including decimal amounts.
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Shared handle to the local database.
///
/// Cheap to clone; every clone uses the same pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database described by `config`, creating the file if missing,
    /// and make sure every table exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the connection or schema setup fails.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let store = Self::connect(config).await?;
        store.ensure_all(config.reset_orders_on_launch).await?;
        Ok(store)
    }

    /// Connect without touching the schema.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the URL is invalid or the
    /// database cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(config.url.expose_secret())?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections.max(1),
            "Database pool created"
        );
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the full schema.
    ///
    /// Uses a single connection that is never recycled, since each SQLite
    /// in-memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if SQLite cannot be initialised.
    pub async fn in_memory() -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_all(false).await?;
        Ok(store)
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create every table in dependency-free order: `users`, `products`,
    /// `cart`, `orders`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any DDL statement fails.
    pub async fn ensure_all(&self, reset_orders: bool) -> Result<(), RepositoryError> {
        for table in schema::tables(reset_orders) {
            self.ensure_schema(&table).await?;
        }
        Ok(())
    }

    /// Create a table and its indexes if absent.
    ///
    /// A table flagged `reset_on_launch` is dropped first, discarding its rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any DDL statement fails.
    #[instrument(skip(self, table), fields(table = table.name))]
    pub async fn ensure_schema(&self, table: &TableDef) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if table.reset_on_launch {
            warn!("Dropping table before recreating it; existing rows are discarded");
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table.name))
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(table.create_sql).execute(&mut *tx).await?;
        for index in table.indexes {
            sqlx::query(index).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Run a parameterized statement and return the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, RepositoryError> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Run a parameterized query and return every row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fetch_all(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Vec<SqliteRow>, RepositoryError> {
        Ok(bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?)
    }
}

/// Bind positional parameters in order.
fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<i64>),
            SqlParam::Integer(v) => query.bind(*v),
            SqlParam::Real(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

/// Read a decimal stored as TEXT.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in {column}: {raw:?} ({e})"))
    })
}

/// Read an optional decimal stored as TEXT.
pub(crate) fn optional_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| {
        Decimal::from_str(&raw).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid decimal in {column}: {raw:?} ({e})"))
        })
    })
    .transpose()
}

/// Map a unique-constraint violation to `Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
