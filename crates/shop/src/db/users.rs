//! User repository for database operations.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::instrument;

use cartwheel_core::{Email, SubscriptionDays, SubscriptionType};

use super::{RepositoryError, Store, conflict_on_unique};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, subscription_type, subscription_days";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, user, password_hash), fields(email = %user.email))]
    pub async fn create(&self, user: &NewUser, password_hash: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, password_hash, subscription_type, subscription_days) \
             VALUES (?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.subscription_type.as_str())
        .bind(user.subscription_days.map(|d| i64::from(d.get())))
        .fetch_one(self.store.pool())
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        user_from_row(&row)
    }

    /// Get a user together with their password hash, by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.store.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash: String = row.try_get("password_hash")?;
        Ok(Some((user_from_row(&row)?, hash)))
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    let subscription_type: String = row.try_get("subscription_type")?;
    let subscription_type = subscription_type
        .parse::<SubscriptionType>()
        .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

    let subscription_days = row
        .try_get::<Option<i64>, _>("subscription_days")?
        .map(|days| {
            u32::try_from(days).map(SubscriptionDays::new).map_err(|_| {
                RepositoryError::DataCorruption(format!("invalid subscription_days: {days}"))
            })
        })
        .transpose()?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        subscription_type,
        subscription_days,
    })
}
