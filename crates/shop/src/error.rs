//! Unified error handling with Sentry integration.
//!
//! Every screen action returns `Result<T, AppError>`. Validation and
//! credential problems are shown to the shopper as-is; store, catalog and
//! other internal failures are captured to Sentry and shown as a generic
//! alert.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::lifetime::Cancelled;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::session::SessionError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Catalog request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The screen was dismissed before the action finished.
    #[error("Cancelled")]
    Cancelled(#[from] Cancelled),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The action needs a signed-in shopper.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether the error is the shopper's to fix (validation, credentials,
    /// missing items) rather than an internal failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        match self {
            Self::Database(RepositoryError::NotFound) => true,
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
            | Self::Checkout(CheckoutError::Repository(_))
            | Self::Config(_)
            | Self::Database(_)
            | Self::Catalog(_)
            | Self::Session(_) => false,
            Self::Auth(_)
            | Self::Checkout(_)
            | Self::Cancelled(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::BadRequest(_) => true,
        }
    }

    /// Alert text safe to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Item not found".to_string(),
            Self::Database(_)
            | Self::Session(_)
            | Self::Checkout(CheckoutError::Repository(_))
            | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                "Could not save your changes, please try again".to_string()
            }
            Self::Config(e) => e.to_string(),
            Self::Catalog(_) => "The product catalog is unavailable".to_string(),
            Self::Checkout(CheckoutError::EmptyCart) => "Your cart is empty".to_string(),
            Self::Auth(err) => match err {
                AuthError::MissingFields(_) => "Please fill in all fields".to_string(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::UnsupportedSubscriptionDays(_) => {
                    "Subscription length must be 5 or 10 days".to_string()
                }
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::Cancelled(_) => "Cancelled".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error and capture internal failures to Sentry.
    pub fn report(&self) {
        if self.is_user_facing() {
            tracing::info!(error = %self, "Action rejected");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Action failed"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
