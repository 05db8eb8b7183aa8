//! Cache types for catalog responses.

use cartwheel_core::ProductId;

use super::types::{Product, ProductListing};

/// Cache key for listings, searches and single products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products { limit: u32, skip: u32 },
    Search(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Listing(ProductListing),
}
