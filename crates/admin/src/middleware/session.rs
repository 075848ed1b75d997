//! Session layer configuration for admin.
//!
//! Same store as the storefront but a separate cookie, `SameSite=Strict` and a
//! shorter inactivity window.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "loomwear_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over any store.
///
/// The binary passes a `PostgresStore`; tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &AdminConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
