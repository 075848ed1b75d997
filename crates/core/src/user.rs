//! Backend user accounts and the payloads that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId, UserRole};

/// A user account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Account creation date as `DD/MM/YYYY`.
    #[must_use]
    pub fn display_created(&self) -> String {
        self.created_at
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password: String,
}

/// Password reset request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub email: Email,
    pub new_password: String,
}

/// Profile update request body. A blank password leaves it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_with_missing_role() {
        let json = r#"{"_id": "u1", "firstName": "Asha", "lastName": "Rao", "email": "a@b.co", "createdAt": "2024-01-31T12:00:00Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.full_name(), "Asha Rao");
        assert_eq!(user.display_created(), "31/01/2024");
    }

    #[test]
    fn test_admin_role() {
        let json = r#"{"id": "u2", "role": "admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.role.is_admin());
        assert_eq!(user.display_created(), "");
    }

    #[test]
    fn test_profile_update_skips_blank_password() {
        let update = ProfileUpdate {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: Email::parse("a@b.co").unwrap(),
            password: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["firstName"], "A");
        assert!(json.get("password").is_none());
    }
}
