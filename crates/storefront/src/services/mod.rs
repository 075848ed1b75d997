//! Business logic services for the storefront.
//!
//! - `cart` - Session cart mirror kept in step with the backend cart

pub mod cart;
