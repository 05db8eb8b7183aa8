//! Shop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CARTWHEEL_DATABASE_URL` - SQLite connection string (default: `sqlite://cartwheel.db`)
//! - `CARTWHEEL_DATABASE_MAX_CONNECTIONS` - Pool size (default: 1)
//! - `CARTWHEEL_RESET_ORDERS_ON_LAUNCH` - Drop and recreate the `orders` table on
//!   startup (default: false; destroys order history)
//! - `CARTWHEEL_CATALOG_URL` - Product catalog base URL (default: `https://dummyjson.com`)
//! - `CARTWHEEL_CATALOG_PAGE_SIZE` - Products per listing request (default: 500)
//! - `CARTWHEEL_CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `CARTWHEEL_CATALOG_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `CARTWHEEL_SESSION_PATH` - Session file location (default: `.cartwheel-session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "sqlite://cartwheel.db";
const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";
const DEFAULT_SESSION_PATH: &str = ".cartwheel-session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Local database settings
    pub database: DatabaseConfig,
    /// Remote catalog settings
    pub catalog: CatalogConfig,
    /// Where the session key-value file lives
    pub session_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// SQLite store configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: SecretString,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Drop the `orders` table before recreating it on startup
    pub reset_orders_on_launch: bool,
}

/// Remote product catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Products requested per listing
    pub page_size: u32,
    /// Response cache time-to-live
    pub cache_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: SecretString::from(
                lookup("CARTWHEEL_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            ),
            max_connections: parse_or(&lookup, "CARTWHEEL_DATABASE_MAX_CONNECTIONS", 1)?,
            reset_orders_on_launch: parse_bool_or(
                &lookup,
                "CARTWHEEL_RESET_ORDERS_ON_LAUNCH",
                false,
            )?,
        };

        let catalog = CatalogConfig {
            base_url: parse_base_url(
                "CARTWHEEL_CATALOG_URL",
                &lookup("CARTWHEEL_CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.into()),
            )?,
            page_size: parse_or(&lookup, "CARTWHEEL_CATALOG_PAGE_SIZE", 500)?,
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "CARTWHEEL_CATALOG_CACHE_TTL_SECS",
                300,
            )?),
            timeout: Duration::from_secs(parse_or(&lookup, "CARTWHEEL_CATALOG_TIMEOUT_SECS", 10)?),
        };

        Ok(Self {
            database,
            catalog,
            session_path: lookup("CARTWHEEL_SESSION_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH), PathBuf::from),
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

impl CatalogConfig {
    /// Catalog settings pointing at `base_url` with default limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL is not an absolute http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            page_size: 500,
            cache_ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(10),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`).
fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

/// Parse a base URL and make sure relative joins append to its path.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.into(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ShopConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShopConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database.url.expose_secret(), "sqlite://cartwheel.db");
        assert_eq!(config.database.max_connections, 1);
        assert!(!config.database.reset_orders_on_launch);
        assert_eq!(config.catalog.base_url.as_str(), "https://dummyjson.com/");
        assert_eq!(config.catalog.page_size, 500);
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.session_path, PathBuf::from(".cartwheel-session.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CARTWHEEL_DATABASE_URL", "sqlite::memory:"),
            ("CARTWHEEL_RESET_ORDERS_ON_LAUNCH", "yes"),
            ("CARTWHEEL_CATALOG_URL", "http://localhost:8080/api"),
            ("CARTWHEEL_CATALOG_PAGE_SIZE", "30"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();
        assert_eq!(config.database.url.expose_secret(), "sqlite::memory:");
        assert!(config.database.reset_orders_on_launch);
        assert_eq!(config.catalog.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(config.catalog.page_size, 30);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[("CARTWHEEL_CATALOG_PAGE_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CARTWHEEL_CATALOG_PAGE_SIZE"));
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        assert!(load(&[("CARTWHEEL_RESET_ORDERS_ON_LAUNCH", "maybe")]).is_err());
    }

    #[test]
    fn test_non_http_catalog_url_is_rejected() {
        assert!(load(&[("CARTWHEEL_CATALOG_URL", "ftp://example.com")]).is_err());
        assert!(load(&[("CARTWHEEL_CATALOG_URL", "not a url")]).is_err());
    }
}
