//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use loomwear_core::{UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend user ID.
    pub id: UserId,
    /// Role reported by the backend at login.
    pub role: UserRole,
    /// First name, for the header greeting.
    pub first_name: String,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for storefront state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the local cart mirror.
    pub const CART: &str = "cart";

    /// Key for pending notices.
    pub const NOTICES: &str = "notices";
}
