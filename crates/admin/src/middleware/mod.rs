//! Middleware and extractors for admin.

pub mod auth;
pub mod session;

pub use auth::{OptionalAdmin, RequireAdmin, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
