//! CLI command implementations.

pub mod catalog;
pub mod migrate;
pub mod orders;

use std::time::Duration;

use loomwear_backend::{BackendClient, BackendConfig, BackendError};

/// Build a backend client from `BACKEND_BASE_URL` (default `http://localhost:5000`).
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn backend_client() -> Result<BackendClient, BackendError> {
    dotenvy::dotenv().ok();

    let base_url = std::env::var("BACKEND_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "http://localhost:5000".to_owned());
    tracing::debug!(%base_url, "Using commerce backend");

    BackendClient::new(&BackendConfig {
        base_url,
        timeout: Duration::from_secs(30),
        cache_ttl: None,
    })
}
