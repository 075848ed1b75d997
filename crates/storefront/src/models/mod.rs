//! Session-held models for the storefront.
//!
//! The backend owns every persistent entity. The storefront keeps only the
//! signed-in identity, the local cart mirror and pending notices, all stored
//! in the visitor's session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
