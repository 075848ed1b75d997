//! Session-related types.

use serde::{Deserialize, Serialize};

use loomwear_core::{UserId, UserRole};

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user ID.
    pub id: UserId,
    /// Role reported by the backend at login. Re-checked on every request.
    pub role: UserRole,
    /// Display name for the sidebar.
    pub name: String,
}

impl CurrentAdmin {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for admin state.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for pending notices.
    pub const NOTICES: &str = "notices";
}
