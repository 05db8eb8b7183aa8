//! Remote product catalog client.
//!
//! Read-only JSON over HTTP with `reqwest`. Listings, searches and product
//! details are cached in memory with `moka` for the configured TTL.
//!
//! # Endpoints
//!
//! - `GET /products?limit=N&skip=M` - a page of products
//! - `GET /products/{id}` - one product
//! - `GET /products/search?q=...` - products matching a query

mod cache;
pub mod types;

pub use types::{Dimensions, Product, ProductListing, ProductMeta, Review};

use std::sync::Arc;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use cartwheel_core::ProductId;

use crate::config::CatalogConfig;
use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("catalog returned {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the product catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self, limit: u32, skip: u32) -> Result<ProductListing, CatalogError> {
        let key = CacheKey::Products { limit, skip };
        if let Some(CacheValue::Listing(listing)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(listing);
        }

        let mut url = self.endpoint("products")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("skip", &skip.to_string());

        let listing: ProductListing = self.get_json(url).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Listing(listing.clone()))
            .await;
        Ok(listing)
    }

    /// Get one product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Status` with 404 if the product does not exist,
    /// or another error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let product: Product = self.get_json(url).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Search products by free text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<ProductListing, CatalogError> {
        let key = CacheKey::Search(query.to_owned());
        if let Some(CacheValue::Listing(listing)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for search");
            return Ok(listing);
        }

        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("q", query);

        let listing: ProductListing = self.get_json(url).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Listing(listing.clone()))
            .await;
        Ok(listing)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Read the body first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn offline_client() -> CatalogClient {
        // Port 9 (discard) is closed on loopback, so every request fails fast.
        let config = CatalogConfig {
            timeout: Duration::from_secs(2),
            ..CatalogConfig::with_base_url("http://127.0.0.1:9").unwrap()
        };
        CatalogClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = offline_client();
        assert_eq!(
            client.endpoint("products/search").unwrap().as_str(),
            "http://127.0.0.1:9/products/search"
        );
    }

    #[tokio::test]
    async fn test_unreachable_catalog_is_http_error() {
        let client = offline_client();
        let err = client.list_products(10, 0).await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }

    #[tokio::test]
    async fn test_cached_listing_skips_network() {
        let client = offline_client();
        let listing: ProductListing = serde_json::from_str(types::tests::LISTING_JSON).unwrap();
        client
            .inner
            .cache
            .insert(
                CacheKey::Products { limit: 2, skip: 0 },
                CacheValue::Listing(listing.clone()),
            )
            .await;

        assert_eq!(client.list_products(2, 0).await.unwrap(), listing);
        assert!(client.list_products(2, 2).await.is_err());
    }
}
