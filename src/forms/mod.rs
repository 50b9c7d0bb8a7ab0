//! Local form validation. Nothing here talks to the server.

mod checkout;
mod signup;

use thiserror::Error;

pub use checkout::{place_order, CardDetails, CheckoutForm, OrderSummary, PaymentMethod};
pub use signup::SignupForm;

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Card number must be 12 to 19 digits")]
    InvalidCardNumber,

    #[error("Card expiry must be in MM/YY format")]
    InvalidCardExpiry,

    #[error("CVC must be 3 or 4 digits")]
    InvalidCardCvc,

    #[error("Cart is empty")]
    EmptyCart,
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), ValidationError> {
    require(value, "Email")?;
    let value = value.trim();
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if !valid {
        return Err(ValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}
