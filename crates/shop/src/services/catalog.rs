//! Catalog browsing.
//!
//! Wraps [`CatalogClient`] so that screens never see a remote failure: an
//! unreachable or misbehaving catalog is logged and shows up as an empty
//! listing or a missing product. Successful listings are also saved to the
//! local product snapshot.

use tracing::{instrument, warn};

use cartwheel_core::ProductId;

use crate::catalog::{CatalogClient, CatalogError, Product, ProductListing};
use crate::db::Store;
use crate::db::products::ProductRepository;

/// Catalog facade for screens.
pub struct Catalog<'a> {
    client: &'a CatalogClient,
    store: &'a Store,
}

impl<'a> Catalog<'a> {
    /// Create a new catalog facade.
    #[must_use]
    pub const fn new(client: &'a CatalogClient, store: &'a Store) -> Self {
        Self { client, store }
    }

    /// A page of products, or an empty listing if the catalog is unavailable.
    #[instrument(skip(self))]
    pub async fn list(&self, limit: u32, skip: u32) -> ProductListing {
        match self.client.list_products(limit, skip).await {
            Ok(listing) => {
                self.save_snapshot(&listing.products).await;
                listing
            }
            Err(e) => degraded(&e, "product listing"),
        }
    }

    /// Products matching `query`, or an empty listing if the catalog is
    /// unavailable.
    pub async fn search(&self, query: &str) -> ProductListing {
        match self.client.search(query).await {
            Ok(listing) => listing,
            Err(e) => degraded(&e, "product search"),
        }
    }

    /// One product, or `None` if it does not exist or the catalog is
    /// unavailable.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        match self.client.product(id).await {
            Ok(product) => Some(product),
            Err(CatalogError::Status { status: 404, .. }) => None,
            Err(e) => {
                warn!(error = %e, product_id = %id, "Catalog unavailable; product not shown");
                None
            }
        }
    }

    async fn save_snapshot(&self, products: &[Product]) {
        if products.is_empty() {
            warn!("Catalog returned no products");
            return;
        }
        if let Err(e) = ProductRepository::new(self.store).upsert_many(products).await {
            warn!(error = %e, "Failed to save product snapshot");
        }
    }
}

fn degraded(error: &CatalogError, what: &str) -> ProductListing {
    warn!(error = %error, "Catalog unavailable; showing empty {what}");
    ProductListing::empty()
}
