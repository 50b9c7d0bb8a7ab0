//! Checkout form and simulated order placement.

use rust_decimal::Decimal;

use crate::store::cart::{Cart, CartLine};

use super::{require, require_email, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub name: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard(CardDetails),
    PayPal,
    ApplePay,
    GooglePay,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard(_) => "credit_card",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::ApplePay => "apple_pay",
            PaymentMethod::GooglePay => "google_pay",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub payment: PaymentMethod,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email(&self.email)?;
        require(&self.country, "Country")?;
        require(&self.first_name, "First name")?;
        require(&self.last_name, "Last name")?;
        require(&self.address, "Address")?;
        require(&self.city, "City")?;
        require(&self.zip_code, "Zip code")?;
        if let PaymentMethod::CreditCard(card) = &self.payment {
            validate_card(card)?;
        }
        Ok(())
    }
}

fn validate_card(card: &CardDetails) -> Result<(), ValidationError> {
    let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCardNumber);
    }

    require(&card.name, "Name on card")?;

    let expiry_ok = card
        .expiry
        .trim()
        .split_once('/')
        .is_some_and(|(month, year)| {
            let month_ok = month.len() == 2 && matches!(month.parse::<u8>(), Ok(1..=12));
            let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());
            month_ok && year_ok
        });
    if !expiry_ok {
        return Err(ValidationError::InvalidCardExpiry);
    }

    let cvc = card.cvc.trim();
    if !(3..=4).contains(&cvc.len()) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCardCvc);
    }
    Ok(())
}

/// What the customer is charged for. Lines are the cart's snapshots at
/// the moment of checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub email: String,
    pub lines: Vec<CartLine>,
    pub item_count: u64,
    pub total: Decimal,
    pub payment: &'static str,
}

/// Validate the form against the cart and produce the order.
///
/// There is no order endpoint on the server; placement is local only.
pub fn place_order(cart: &Cart, form: &CheckoutForm) -> Result<OrderSummary, ValidationError> {
    if cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    form.validate()?;
    Ok(OrderSummary {
        email: form.email.trim().to_string(),
        lines: cart.lines().to_vec(),
        item_count: cart.item_count(),
        total: cart.total(),
        payment: form.payment.label(),
    })
}
