//! Checkout state machine.
//!
//! Steps advance strictly in order: cart, shipping, payment, review,
//! success. Going back keeps earlier selections; skipping ahead fails with
//! [`CheckoutError::StepNotReady`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::types::{Email, Price};

/// Checkout errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("complete the {0} step first")]
    StepNotReady(CheckoutStep),

    #[error("{0} is required")]
    InvalidAddress(&'static str),

    #[error("unknown shipping method: {0}")]
    UnknownShippingMethod(String),

    #[error("invalid payment details: {0}")]
    InvalidPayment(String),
}

/// A checkout step, ordered by progress.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Payment,
    Review,
    Success,
}

impl CheckoutStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Shipping => "shipping",
            Self::Payment => "payment",
            Self::Review => "review",
            Self::Success => "success",
        }
    }

    /// Storefront path for the step.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Cart => "/cart",
            Self::Shipping => "/checkout/shipping",
            Self::Payment => "/checkout/payment",
            Self::Review => "/checkout/review",
            Self::Success => "/checkout/success",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Check required fields and return a trimmed copy.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidAddress`] naming the first blank
    /// required field.
    pub fn validated(&self) -> Result<Self, CheckoutError> {
        let trimmed = Self {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            line1: self.line1.trim().to_string(),
            line2: self.line2.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
        };

        let required = [
            ("full name", &trimmed.full_name),
            ("phone", &trimmed.phone),
            ("address", &trimmed.line1),
            ("city", &trimmed.city),
            ("state", &trimmed.state),
            ("postal code", &trimmed.postal_code),
            ("country", &trimmed.country),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(CheckoutError::InvalidAddress(field));
        }

        Ok(trimmed)
    }
}

/// Available shipping methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethodId {
    Standard,
    Express,
    Overnight,
}

impl ShippingMethodId {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Express, Self::Overnight];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Overnight => "overnight",
        }
    }

    #[must_use]
    pub const fn method(self) -> ShippingMethod {
        match self {
            Self::Standard => ShippingMethod {
                id: self,
                name: "Standard Shipping",
                price: Decimal::from_parts(599, 0, 0, false, 2),
                estimate: "5-7 business days",
            },
            Self::Express => ShippingMethod {
                id: self,
                name: "Express Shipping",
                price: Decimal::from_parts(1499, 0, 0, false, 2),
                estimate: "2-3 business days",
            },
            Self::Overnight => ShippingMethod {
                id: self,
                name: "Overnight Shipping",
                price: Decimal::from_parts(2999, 0, 0, false, 2),
                estimate: "Next business day",
            },
        }
    }
}

impl fmt::Display for ShippingMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethodId {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            other => Err(CheckoutError::UnknownShippingMethod(other.to_string())),
        }
    }
}

/// A shipping option with its fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: &'static str,
    pub price: Decimal,
    pub estimate: &'static str,
}

impl ShippingMethod {
    #[must_use]
    pub fn price_display(&self) -> String {
        Price::usd(self.price).display()
    }
}

/// Payment selection. Only the last four card digits are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard { holder_name: String, last_four: String },
    Paypal { email: Email },
    ApplePay,
    GooglePay,
    CashOnDelivery,
}

impl PaymentMethod {
    /// Build a card payment from the full number, keeping the last four
    /// digits. Spaces and dashes in the number are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidPayment`] for a blank holder name or a
    /// number that is not 12 to 19 digits passing the Luhn check.
    pub fn credit_card(holder_name: &str, number: &str) -> Result<Self, CheckoutError> {
        let holder_name = holder_name.trim();
        if holder_name.is_empty() {
            return Err(CheckoutError::InvalidPayment(
                "card holder name is required".to_string(),
            ));
        }

        let digits: String = number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !(12..=19).contains(&digits.len())
            || !digits.chars().all(|c| c.is_ascii_digit())
            || !luhn_valid(&digits)
        {
            return Err(CheckoutError::InvalidPayment(
                "card number is not valid".to_string(),
            ));
        }

        let last_four = digits.get(digits.len() - 4..).unwrap_or_default();
        Ok(Self::CreditCard {
            holder_name: holder_name.to_string(),
            last_four: last_four.to_string(),
        })
    }

    /// Build a `PayPal` payment.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidPayment`] if the email is invalid.
    pub fn paypal(email: &str) -> Result<Self, CheckoutError> {
        Email::parse(email)
            .map(|email| Self::Paypal { email })
            .map_err(|e| CheckoutError::InvalidPayment(e.to_string()))
    }

    /// Short description for the review and confirmation pages.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::CreditCard { last_four, .. } => format!("Card ending in {last_four}"),
            Self::Paypal { email } => format!("PayPal ({email})"),
            Self::ApplePay => "Apple Pay".to_string(),
            Self::GooglePay => "Google Pay".to_string(),
            Self::CashOnDelivery => "Cash on delivery".to_string(),
        }
    }
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Human-facing number, e.g. `SF-1A2B3C4D`.
    pub order_number: String,
    pub items: Vec<CartItem>,
    pub address: Address,
    pub shipping: ShippingMethodId,
    pub payment: PaymentMethod,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub fn total_display(&self) -> String {
        Price::usd(self.total).display()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Order number derived from the order id.
#[must_use]
pub fn order_number(id: Uuid) -> String {
    let simple = id.simple().to_string().to_uppercase();
    format!("SF-{}", simple.get(..8).unwrap_or(&simple))
}

/// In-progress checkout selections, persisted in the visitor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    /// Furthest step reached; `back_to` may not go past it.
    #[serde(default)]
    pub reached: CheckoutStep,
    pub address: Option<Address>,
    pub shipping_method: Option<ShippingMethodId>,
    pub payment: Option<PaymentMethod>,
}

impl CheckoutState {
    /// Start checkout for a cart.
    ///
    /// A checkout that already reached a later step is left there so the
    /// shopper can resume.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart.
    pub fn begin(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if self.step == CheckoutStep::Success {
            *self = Self::default();
        }
        if self.step == CheckoutStep::Cart {
            self.advance(CheckoutStep::Shipping);
        }
        Ok(())
    }

    /// Record the address and shipping method and move to payment.
    ///
    /// # Errors
    ///
    /// Fails if checkout has not begun or the address is incomplete.
    pub fn set_shipping(
        &mut self,
        address: &Address,
        method: ShippingMethodId,
    ) -> Result<(), CheckoutError> {
        self.require(CheckoutStep::Shipping)?;
        self.address = Some(address.validated()?);
        self.shipping_method = Some(method);
        self.advance(CheckoutStep::Payment);
        Ok(())
    }

    /// Record the payment method and move to review.
    ///
    /// # Errors
    ///
    /// Fails if shipping has not been chosen yet.
    pub fn set_payment(&mut self, payment: PaymentMethod) -> Result<(), CheckoutError> {
        self.require(CheckoutStep::Payment)?;
        if self.address.is_none() || self.shipping_method.is_none() {
            return Err(CheckoutError::StepNotReady(CheckoutStep::Shipping));
        }
        self.payment = Some(payment);
        self.advance(CheckoutStep::Review);
        Ok(())
    }

    /// Return to an earlier step that was already reached.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::StepNotReady`] for a step not yet reached or
    /// once the order is placed.
    pub fn back_to(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Success
            || step == CheckoutStep::Success
            || step > self.reached
        {
            return Err(CheckoutError::StepNotReady(step));
        }
        self.step = step;
        Ok(())
    }

    /// Shipping method chosen so far.
    #[must_use]
    pub fn shipping(&self) -> Option<ShippingMethod> {
        self.shipping_method.map(ShippingMethodId::method)
    }

    /// Cart subtotal plus the chosen shipping price.
    #[must_use]
    pub fn total_for(&self, cart: &Cart) -> Decimal {
        cart.subtotal() + self.shipping().map_or(Decimal::ZERO, |m| m.price)
    }

    /// Build the order and move to success.
    ///
    /// # Errors
    ///
    /// Fails unless the checkout is at review with every selection made and
    /// the cart is non-empty.
    pub fn place_order(
        &mut self,
        cart: &Cart,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::StepNotReady(self.next_missing()));
        }
        let (Some(address), Some(shipping), Some(payment)) = (
            self.address.clone(),
            self.shipping_method,
            self.payment.clone(),
        ) else {
            return Err(CheckoutError::StepNotReady(self.next_missing()));
        };

        let subtotal = cart.subtotal();
        let shipping_cost = shipping.method().price;
        let order = Order {
            id,
            order_number: order_number(id),
            items: cart.items.clone(),
            address,
            shipping,
            payment,
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
            placed_at: now,
        };

        self.advance(CheckoutStep::Success);
        Ok(order)
    }

    /// Discard all selections.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn require(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Success || self.reached < step {
            return Err(CheckoutError::StepNotReady(self.next_missing()));
        }
        Ok(())
    }

    fn next_missing(&self) -> CheckoutStep {
        if self.reached < CheckoutStep::Shipping {
            CheckoutStep::Cart
        } else if self.address.is_none() || self.shipping_method.is_none() {
            CheckoutStep::Shipping
        } else if self.payment.is_none() {
            CheckoutStep::Payment
        } else {
            CheckoutStep::Review
        }
    }

    fn advance(&mut self, step: CheckoutStep) {
        self.step = step;
        self.reached = self.reached.max(step);
    }
}
