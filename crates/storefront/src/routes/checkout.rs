//! Checkout route handlers.
//!
//! Each page maps to a [`CheckoutStep`]. Opening a page for a step the
//! shopper has not reached redirects to the furthest valid step; opening an
//! earlier page steps back while keeping the selections made so far.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use shopfront_core::Price;
use shopfront_core::cart::Cart;
use shopfront_core::checkout::{
    Address, CheckoutError, CheckoutState, CheckoutStep, Order, PaymentMethod, ShippingMethod,
    ShippingMethodId,
};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session::{
    keys, load_cart, load_checkout, load_last_order, save_cart, save_checkout,
};
use crate::state::AppState;

// =============================================================================
// Forms
// =============================================================================

/// Shipping step form data.
#[derive(Debug, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub shipping_method: String,
}

impl ShippingForm {
    fn address(&self) -> Address {
        Address {
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

/// Payment step form data.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub paypal_email: String,
}

impl PaymentForm {
    fn payment_method(&self) -> std::result::Result<PaymentMethod, CheckoutError> {
        match self.method.trim() {
            "credit_card" => PaymentMethod::credit_card(&self.card_holder, &self.card_number),
            "paypal" => PaymentMethod::paypal(&self.paypal_email),
            "apple_pay" => Ok(PaymentMethod::ApplePay),
            "google_pay" => Ok(PaymentMethod::GooglePay),
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "" => Err(CheckoutError::InvalidPayment(
                "choose a payment method".to_string(),
            )),
            other => Err(CheckoutError::InvalidPayment(format!(
                "unsupported method {other}"
            ))),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Shipping option radio button.
#[derive(Clone)]
pub struct ShippingOption {
    pub id: &'static str,
    pub name: &'static str,
    pub price: String,
    pub estimate: &'static str,
    pub selected: bool,
}

fn shipping_options(selected: Option<ShippingMethodId>) -> Vec<ShippingOption> {
    let selected = selected.unwrap_or(ShippingMethodId::Standard);
    ShippingMethodId::ALL
        .iter()
        .map(|id| {
            let method = id.method();
            ShippingOption {
                id: id.as_str(),
                name: method.name,
                price: method.price_display(),
                estimate: method.estimate,
                selected: *id == selected,
            }
        })
        .collect()
}

/// Shipping step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/shipping.html")]
pub struct ShippingTemplate {
    pub cart: Cart,
    pub address: Address,
    pub options: Vec<ShippingOption>,
    pub error: Option<String>,
}

/// Payment step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub cart: Cart,
    pub shipping: ShippingMethod,
    pub total: String,
    pub method: String,
    pub card_holder: String,
    pub paypal_email: String,
    pub error: Option<String>,
}

/// Review step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/review.html")]
pub struct ReviewTemplate {
    pub cart: Cart,
    pub address: Address,
    pub shipping: ShippingMethod,
    pub payment: String,
    pub total: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub order: Order,
    pub shipping: ShippingMethod,
    pub payment: String,
    pub subtotal: String,
}

// =============================================================================
// Step Guard
// =============================================================================

/// Outcome of opening a checkout page.
enum Entry {
    Ready(Cart, CheckoutState),
    Redirect(Redirect),
}

/// Load the session and step back to `step`, or redirect when that step is
/// not available.
async fn enter(session: &Session, step: CheckoutStep) -> Result<Entry> {
    let cart = load_cart(session).await?;
    if cart.is_empty() {
        return Ok(Entry::Redirect(Redirect::to(CheckoutStep::Cart.path())));
    }

    let mut checkout = load_checkout(session).await?;
    if checkout.back_to(step).is_err() {
        return Ok(Entry::Redirect(Redirect::to("/checkout")));
    }
    save_checkout(session, &checkout).await?;
    Ok(Entry::Ready(cart, checkout))
}

fn total_display(checkout: &CheckoutState, cart: &Cart) -> String {
    Price::usd(checkout.total_for(cart)).display()
}

// =============================================================================
// Handlers
// =============================================================================

/// Start or resume checkout at the current step.
#[instrument(skip(session))]
pub async fn start(session: Session) -> Result<Redirect> {
    let cart = load_cart(&session).await?;
    let mut checkout = load_checkout(&session).await?;

    match checkout.begin(&cart) {
        Ok(()) => {}
        Err(CheckoutError::EmptyCart) => return Ok(Redirect::to(CheckoutStep::Cart.path())),
        Err(e) => return Err(e.into()),
    }
    save_checkout(&session, &checkout).await?;

    Ok(Redirect::to(checkout.step.path()))
}

/// Display the shipping step.
#[instrument(skip(session))]
pub async fn shipping_page(session: Session) -> Result<Response> {
    let (cart, checkout) = match enter(&session, CheckoutStep::Shipping).await? {
        Entry::Ready(cart, checkout) => (cart, checkout),
        Entry::Redirect(redirect) => return Ok(redirect.into_response()),
    };

    Ok(ShippingTemplate {
        cart,
        address: checkout.address.clone().unwrap_or_default(),
        options: shipping_options(checkout.shipping_method),
        error: None,
    }
    .into_response())
}

/// Save the address and shipping method.
#[instrument(skip(session, form))]
pub async fn shipping_submit(session: Session, Form(form): Form<ShippingForm>) -> Result<Response> {
    let (cart, mut checkout) = match enter(&session, CheckoutStep::Shipping).await? {
        Entry::Ready(cart, checkout) => (cart, checkout),
        Entry::Redirect(redirect) => return Ok(redirect.into_response()),
    };

    let address = form.address();
    let method = form.shipping_method.parse::<ShippingMethodId>();
    let result = method
        .clone()
        .and_then(|method| checkout.set_shipping(&address, method));

    if let Err(e) = result {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            ShippingTemplate {
                cart,
                address,
                options: shipping_options(method.ok()),
                error: Some(e.to_string()),
            },
        )
            .into_response());
    }

    save_checkout(&session, &checkout).await?;
    add_breadcrumb("checkout", "Shipping selected", &[("method", form.shipping_method.trim())]);
    Ok(Redirect::to(CheckoutStep::Payment.path()).into_response())
}

/// Display the payment step.
#[instrument(skip(session))]
pub async fn payment_page(session: Session) -> Result<Response> {
    let (cart, checkout) = match enter(&session, CheckoutStep::Payment).await? {
        Entry::Ready(cart, checkout) => (cart, checkout),
        Entry::Redirect(redirect) => return Ok(redirect.into_response()),
    };
    let shipping = checkout
        .shipping()
        .ok_or_else(|| AppError::Checkout(CheckoutError::StepNotReady(CheckoutStep::Shipping)))?;

    let (method, card_holder, paypal_email) = match &checkout.payment {
        Some(PaymentMethod::CreditCard { holder_name, .. }) => {
            ("credit_card", holder_name.clone(), String::new())
        }
        Some(PaymentMethod::Paypal { email }) => ("paypal", String::new(), email.to_string()),
        Some(PaymentMethod::ApplePay) => ("apple_pay", String::new(), String::new()),
        Some(PaymentMethod::GooglePay) => ("google_pay", String::new(), String::new()),
        Some(PaymentMethod::CashOnDelivery) => ("cash_on_delivery", String::new(), String::new()),
        None => ("credit_card", String::new(), String::new()),
    };

    Ok(PaymentTemplate {
        total: total_display(&checkout, &cart),
        cart,
        shipping,
        method: method.to_string(),
        card_holder,
        paypal_email,
        error: None,
    }
    .into_response())
}

/// Save the payment method.
#[instrument(skip(session, form))]
pub async fn payment_submit(session: Session, Form(form): Form<PaymentForm>) -> Result<Response> {
    let (cart, mut checkout) = match enter(&session, CheckoutStep::Payment).await? {
        Entry::Ready(cart, checkout) => (cart, checkout),
        Entry::Redirect(redirect) => return Ok(redirect.into_response()),
    };

    let result = form
        .payment_method()
        .and_then(|payment| checkout.set_payment(payment));

    match result {
        Ok(()) => {}
        Err(CheckoutError::StepNotReady(step)) => {
            return Ok(Redirect::to(step.path()).into_response());
        }
        Err(e) => {
            let shipping = checkout.shipping().ok_or_else(|| {
                AppError::Checkout(CheckoutError::StepNotReady(CheckoutStep::Shipping))
            })?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                PaymentTemplate {
                    total: total_display(&checkout, &cart),
                    cart,
                    shipping,
                    method: form.method.trim().to_string(),
                    card_holder: form.card_holder.clone(),
                    paypal_email: form.paypal_email.clone(),
                    error: Some(e.to_string()),
                },
            )
                .into_response());
        }
    }

    save_checkout(&session, &checkout).await?;
    add_breadcrumb("checkout", "Payment selected", &[("method", form.method.trim())]);
    Ok(Redirect::to(CheckoutStep::Review.path()).into_response())
}

/// Display the review step.
#[instrument(skip(session))]
pub async fn review_page(session: Session) -> Result<Response> {
    let (cart, checkout) = match enter(&session, CheckoutStep::Review).await? {
        Entry::Ready(cart, checkout) => (cart, checkout),
        Entry::Redirect(redirect) => return Ok(redirect.into_response()),
    };

    let (Some(address), Some(shipping), Some(payment)) = (
        checkout.address.clone(),
        checkout.shipping(),
        checkout.payment.as_ref(),
    ) else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    Ok(ReviewTemplate {
        total: total_display(&checkout, &cart),
        payment: payment.summary(),
        cart,
        address,
        shipping,
    }
    .into_response())
}

/// Submit the order.
///
/// Submission is simulated: it waits for the configured delay and always
/// succeeds. The cart is emptied and the order kept for the confirmation
/// page.
///
/// The session is first read after the delay, so cart changes made by
/// other requests while waiting are part of the order rather than lost.
#[instrument(skip(state, session))]
pub async fn place_order(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    tokio::time::sleep(state.config().checkout_delay).await;

    let mut cart = load_cart(&session).await?;
    let mut checkout = load_checkout(&session).await?;

    let order = match checkout.place_order(&cart, Uuid::new_v4(), Utc::now()) {
        Ok(order) => order,
        Err(CheckoutError::EmptyCart) => return Ok(Redirect::to(CheckoutStep::Cart.path())),
        Err(CheckoutError::StepNotReady(step)) => return Ok(Redirect::to(step.path())),
        Err(e) => return Err(e.into()),
    };

    session.insert(keys::LAST_ORDER, &order).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    session.remove_value(keys::CHECKOUT).await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        &[("order_number", order.order_number.as_str())],
    );
    tracing::info!(
        order_number = %order.order_number,
        items = order.item_count(),
        total = %order.total,
        "Order placed"
    );

    Ok(Redirect::to(CheckoutStep::Success.path()))
}

/// Display the order confirmation.
#[instrument(skip(session))]
pub async fn success(session: Session) -> Result<Response> {
    let Some(order) = load_last_order(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    Ok(SuccessTemplate {
        shipping: order.shipping.method(),
        payment: order.payment.summary(),
        subtotal: Price::usd(order.subtotal).display(),
        order,
    }
    .into_response())
}
