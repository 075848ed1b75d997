//! Status and role enums for backend entities.
//!
//! The backend stores both as free-form strings. Known values map to variants;
//! anything else is preserved verbatim so a new status never breaks a listing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    InTransit,
    Delivered,
    /// A status string this build does not know about.
    Other(String),
}

impl OrderStatus {
    /// Statuses an administrator can move an order into.
    pub const SETTABLE: [Self; 3] = [Self::Pending, Self::InTransit, Self::Delivered];

    /// The wire/display label for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Other(s) => s,
        }
    }

    /// Parse one of the settable statuses; returns `None` for anything else.
    #[must_use]
    pub fn parse_settable(s: &str) -> Option<Self> {
        match Self::from(s.to_owned()) {
            Self::Other(_) => None,
            status => Some(status),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => Self::Pending,
            "In Transit" => Self::InTransit,
            "Delivered" => Self::Delivered,
            _ => Self::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role as reported by the backend.
///
/// Only `"admin"` grants access to the admin console; every other value
/// (including a missing role) is treated as a regular customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
}

impl UserRole {
    /// Whether this role may use the admin console.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::Customer
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "user"),
        }
    }
}
