//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the session
//!   store (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_BASE_URL` - Commerce backend URL (default: <http://localhost:5000>)
//! - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 15)
//! - `CATALOG_CACHE_TTL_SECS` - Product cache TTL, 0 disables (default: 60)
//! - `CART_POLL_INTERVAL_SECS` - Cart badge refresh interval (default: 5)
//! - `ADMIN_CONSOLE_URL` - Link shown to admins on their profile page
//!   (default: <http://localhost:3001>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use loomwear_backend::BackendConfig;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` session store URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Commerce backend connection
    pub backend: BackendConfig,
    /// How often the header cart badge refreshes
    pub cart_poll_interval: Duration,
    /// Admin console URL, linked from admin profiles
    pub admin_console_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let cache_ttl = get_secs("CATALOG_CACHE_TTL_SECS", 60)?;
        let backend = BackendConfig {
            base_url: get_url("BACKEND_BASE_URL", "http://localhost:5000")?,
            timeout: Duration::from_secs(get_secs("BACKEND_TIMEOUT_SECS", 15)?),
            cache_ttl: (cache_ttl > 0).then(|| Duration::from_secs(cache_ttl)),
        };

        let poll = get_secs("CART_POLL_INTERVAL_SECS", 5)?;
        if poll == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            backend,
            cart_poll_interval: Duration::from_secs(poll),
            admin_console_url: get_url("ADMIN_CONSOLE_URL", "http://localhost:3001")?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a whole number of seconds.
fn get_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    parse_secs(key, &get_env_or_default(key, &default.to_string()))
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an absolute http(s) URL.
fn get_url(key: &str, default: &str) -> Result<String, ConfigError> {
    parse_url(key, &get_env_or_default(key, default))
}

fn parse_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
