//! Application state shared across handlers.

use std::sync::Arc;

use loomwear_backend::{BackendClient, BackendError};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, backend }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }
}
