//! REST client for the Loomwear commerce backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth for users, products, carts and orders
//! - Every call is an independent HTTP request: no retries, no coordination
//! - Product reads can be cached in memory via `moka` (storefront only)
//!
//! # Example
//!
//! ```rust,ignore
//! use loomwear_backend::{BackendClient, BackendConfig};
//!
//! let client = BackendClient::new(&BackendConfig::default())?;
//! let products = client.list_products().await?;
//! let cart = client.get_cart(&user_id).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod client;
pub mod types;

pub use client::{BackendClient, BackendConfig};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Message suitable for showing to a shopper.
    ///
    /// Backend-provided messages (e.g. "Invalid credentials") pass through;
    /// transport and parse failures collapse to a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::RateLimited(_) => "Too many requests. Please try again shortly.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the backend rejected the request as unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product p1".to_string());
        assert_eq!(err.to_string(), "Not found: product p1");

        let err = BackendError::Status {
            status: 400,
            message: "User already exists".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 400: User already exists");
    }

    #[test]
    fn test_user_message_passes_backend_message() {
        let err = BackendError::Status {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = BackendError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
