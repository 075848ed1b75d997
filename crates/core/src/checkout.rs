//! Checkout form validation.
//!
//! Fields are checked in a fixed order and the first failure wins, so the
//! shopper sees one message at a time.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Payment methods offered at checkout.
pub const PAYMENT_METHODS: [(&str, &str); 1] = [("razorpay", "RazorPay")];

/// Reasons a checkout submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Address is required")]
    AddressRequired,
    #[error("Apartment is required")]
    ApartmentRequired,
    #[error("City is required")]
    CityRequired,
    #[error("Company is required")]
    CompanyRequired,
    #[error("Country is required")]
    CountryRequired,
    #[error("Email address is required")]
    EmailRequired,
    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,
    #[error("Payment type is required")]
    PaymentTypeRequired,
    #[error("Unsupported payment type")]
    UnsupportedPaymentType,
    #[error("Phone is required")]
    PhoneRequired,
    #[error("Postal code is required")]
    PostalCodeRequired,
    #[error("Region is required")]
    RegionRequired,
    #[error("Subtotal is required")]
    SubtotalRequired,
}

/// Raw checkout form as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub email_address: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_type: String,
}

/// A checkout form that passed validation. Values are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub apartment: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub postal_code: String,
    pub phone: String,
    pub payment_method: String,
}

fn required(value: &str, err: CheckoutError) -> Result<String, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_owned())
    }
}

impl CheckoutForm {
    /// Validate the form against the cart subtotal.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in form order: address, apartment,
    /// city, company, country, email, first name, last name, payment type,
    /// phone, postal code, region, then a zero subtotal.
    pub fn validate(&self, subtotal: Decimal) -> Result<ValidCheckout, CheckoutError> {
        let address = required(&self.address, CheckoutError::AddressRequired)?;
        let apartment = required(&self.apartment, CheckoutError::ApartmentRequired)?;
        let city = required(&self.city, CheckoutError::CityRequired)?;
        let company = required(&self.company, CheckoutError::CompanyRequired)?;
        let country = required(&self.country, CheckoutError::CountryRequired)?;
        let email = Email::parse(&required(&self.email_address, CheckoutError::EmailRequired)?)?;
        let first_name = required(&self.first_name, CheckoutError::FirstNameRequired)?;
        let last_name = required(&self.last_name, CheckoutError::LastNameRequired)?;
        let payment_method = required(&self.payment_type, CheckoutError::PaymentTypeRequired)?;
        if !PAYMENT_METHODS.iter().any(|(id, _)| *id == payment_method) {
            return Err(CheckoutError::UnsupportedPaymentType);
        }
        let phone = required(&self.phone, CheckoutError::PhoneRequired)?;
        let postal_code = required(&self.postal_code, CheckoutError::PostalCodeRequired)?;
        let region = required(&self.region, CheckoutError::RegionRequired)?;
        if subtotal.is_zero() {
            return Err(CheckoutError::SubtotalRequired);
        }

        Ok(ValidCheckout {
            email,
            first_name,
            last_name,
            company,
            address,
            apartment,
            city,
            country,
            region,
            postal_code,
            phone,
            payment_method,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn filled_form() -> CheckoutForm {
        CheckoutForm {
            email_address: "asha@example.com".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            company: "Acme".to_string(),
            address: "12 MG Road".to_string(),
            apartment: "4B".to_string(),
            city: "Bengaluru".to_string(),
            country: "India".to_string(),
            region: "Karnataka".to_string(),
            postal_code: "560001".to_string(),
            phone: "9999999999".to_string(),
            payment_type: "razorpay".to_string(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let valid = filled_form().validate(Decimal::new(100, 0)).unwrap();
        assert_eq!(valid.email.as_str(), "asha@example.com");
        assert_eq!(valid.payment_method, "razorpay");
    }

    #[test]
    fn test_first_missing_field_wins() {
        let form = CheckoutForm {
            city: String::new(),
            phone: String::new(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(Decimal::ONE).unwrap_err(),
            CheckoutError::CityRequired
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let form = CheckoutForm {
            address: "   ".to_string(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(Decimal::ONE).unwrap_err(),
            CheckoutError::AddressRequired
        );
    }

    #[test]
    fn test_region_checked_before_subtotal() {
        let form = CheckoutForm {
            region: String::new(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(Decimal::ZERO).unwrap_err(),
            CheckoutError::RegionRequired
        );
    }

    #[test]
    fn test_zero_subtotal_rejected() {
        let err = filled_form().validate(Decimal::ZERO).unwrap_err();
        assert_eq!(err, CheckoutError::SubtotalRequired);
        assert_eq!(err.to_string(), "Subtotal is required");
    }

    #[test]
    fn test_bad_email_and_payment_type() {
        let form = CheckoutForm {
            email_address: "not-an-email".to_string(),
            ..filled_form()
        };
        assert!(matches!(
            form.validate(Decimal::ONE),
            Err(CheckoutError::InvalidEmail(_))
        ));

        let form = CheckoutForm {
            payment_type: "cod".to_string(),
            ..filled_form()
        };
        assert_eq!(
            form.validate(Decimal::ONE).unwrap_err(),
            CheckoutError::UnsupportedPaymentType
        );
    }
}
