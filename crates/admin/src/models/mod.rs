//! Session-held models for the admin console.
//!
//! Every entity the console manages lives in the backend. The session only
//! carries the signed-in administrator and pending notices.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
