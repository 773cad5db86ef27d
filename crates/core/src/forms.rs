//! Form validation.
//!
//! Validation happens before anything reaches the store or a backend: a form
//! either produces a typed value or a set of per-field messages for the UI to
//! show next to each input.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::listing::UNCATEGORIZED;
use crate::types::{Email, Price};

/// Minimum password length accepted by the identity provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A validation message attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name, in the camelCase used by the forms.
    pub field: &'static str,
    pub message: String,
}

/// Every validation failure found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Checkout
// =============================================================================

/// Shipping details entered at checkout. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingDetails {
    /// Check that no field is blank.
    ///
    /// # Errors
    ///
    /// Returns one message per blank field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require("fullName", &self.full_name, "Full name is required");
        errors.require("address", &self.address, "Address is required");
        errors.require("city", &self.city, "City is required");
        errors.require("postalCode", &self.postal_code, "Postal code is required");
        errors.require("country", &self.country, "Country is required");
        errors.into_result(|| ())
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub email: String,
    pub confirm_email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// `YYYY-MM-DD`; optional.
    pub dob: String,
}

impl RegistrationForm {
    /// Validate the form and return the normalized email.
    ///
    /// # Errors
    ///
    /// Returns messages for mismatched confirmations, an invalid email, a
    /// short password or missing names.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::default();

        let email = Email::parse(&self.email)
            .map_err(|e| errors.push("email", e.to_string()))
            .ok();
        if self.email.trim() != self.confirm_email.trim() {
            errors.push("confirmEmail", "Emails do not match");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        if self.password != self.confirm_password {
            errors.push("confirmPassword", "Passwords do not match");
        }
        errors.require("firstName", &self.first_name, "First name is required");
        errors.require("lastName", &self.last_name, "Last name is required");

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Admin drafts
// =============================================================================

/// Product form in the admin panel. Price is raw text from the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub price: String,
    pub image: String,
    pub description: String,
    pub category: String,
}

/// A validated [`ProductDraft`], ready to be written as a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub title: String,
    pub price: Price,
    pub image: String,
    pub description: String,
    pub category: String,
}

impl ProductDraft {
    /// Validate the draft. A blank category becomes `Uncategorized`.
    ///
    /// # Errors
    ///
    /// Returns messages for a blank title or an unparseable price.
    pub fn validate(&self) -> Result<ProductFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.require("title", &self.title, "Title is required");
        let price = Price::parse(&self.price)
            .map_err(|e| errors.push("price", e.to_string()))
            .ok();

        match price {
            Some(price) if errors.is_empty() => {
                let category = match self.category.trim() {
                    "" => UNCATEGORIZED.to_owned(),
                    name => name.to_owned(),
                };
                Ok(ProductFields {
                    title: self.title.trim().to_owned(),
                    price,
                    image: self.image.trim().to_owned(),
                    description: self.description.trim().to_owned(),
                    category,
                })
            }
            _ => Err(errors),
        }
    }
}

/// User form in the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub display_name: String,
    pub photo: String,
}

impl UserDraft {
    /// Validate the draft and return the normalized email.
    ///
    /// # Errors
    ///
    /// Returns a message for an invalid email.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = Email::parse(&self.email)
            .map_err(|e| errors.push("email", e.to_string()))
            .ok();
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }
}
