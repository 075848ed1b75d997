//! Account form validation.
//!
//! Each form deserializes straight from the posted body and validates into the
//! request type the backend expects.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{Email, EmailError};
use crate::user::{Credentials, PasswordReset, ProfileUpdate, Registration};

/// Minimum accepted password length for new passwords.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Please provide both email and new password")]
    ResetIncomplete,
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

fn email(value: &str) -> Result<Email, ValidationError> {
    Ok(Email::parse(&required(value, "Email")?)?)
}

fn new_password(value: &str) -> Result<String, ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(value.to_owned())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns an error for a missing or malformed email or a missing password.
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        Ok(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns the first problem found: a missing field, a malformed email,
    /// mismatched passwords, then a password that is too short.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let first_name = required(&self.first_name, "First name")?;
        let last_name = required(&self.last_name, "Last name")?;
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("Password"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Registration {
            first_name,
            last_name,
            email,
            password: new_password(&self.password)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordForm {
    pub email: String,
    pub new_password: String,
}

impl ResetPasswordForm {
    /// # Errors
    ///
    /// Returns [`ValidationError::ResetIncomplete`] when either field is blank.
    pub fn validate(&self) -> Result<PasswordReset, ValidationError> {
        if self.email.trim().is_empty() || self.new_password.is_empty() {
            return Err(ValidationError::ResetIncomplete);
        }
        Ok(PasswordReset {
            email: Email::parse(&self.email)?,
            new_password: new_password(&self.new_password)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns an error for a missing name or email, or a new password that is
    /// too short. A blank password is accepted and leaves it unchanged.
    pub fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        let first_name = required(&self.first_name, "First name")?;
        let last_name = required(&self.last_name, "Last name")?;
        let email = email(&self.email)?;
        let password = if self.password.is_empty() {
            None
        } else {
            Some(new_password(&self.password)?)
        };
        Ok(ProfileUpdate {
            first_name,
            last_name,
            email,
            password,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_login_requires_email_and_password() {
        let form = LoginForm {
            email: String::new(),
            password: "x".to_string(),
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::Required("Email"));

        let form = LoginForm {
            email: "a@b.co".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err().to_string(), "Password is required");
    }

    #[test]
    fn test_register_valid() {
        let registration = register_form().validate().unwrap();
        assert_eq!(registration.first_name, "Asha");
        assert_eq!(registration.email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_register_password_mismatch() {
        let form = RegisterForm {
            confirm_password: "other12".to_string(),
            ..register_form()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn test_register_short_password() {
        let form = RegisterForm {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            ..register_form()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::PasswordTooShort);
    }

    #[test]
    fn test_reset_requires_both_fields() {
        let form = ResetPasswordForm {
            email: "a@b.co".to_string(),
            new_password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::ResetIncomplete);
    }

    #[test]
    fn test_profile_blank_password_is_kept() {
        let form = ProfileForm {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.co".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap().password, None);
    }
}
