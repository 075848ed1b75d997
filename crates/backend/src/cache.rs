//! Cache types for product reads.

use loomwear_core::ProductId;
use loomwear_core::catalog::Product;

/// Cache key for product reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
