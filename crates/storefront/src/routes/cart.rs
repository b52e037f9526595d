//! Cart route handlers.
//!
//! The cart lives in the session. Mutations redirect back to the cart page
//! and send an `HX-Trigger` so the header badge can refresh itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfront_core::ProductId;
use shopfront_core::cart::{Cart, CartError};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session::{load_cart, save_cart};
use crate::state::AppState;

/// Event name HTMX listeners use to refresh cart widgets.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub variant: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub variant: Option<String>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    pub variant: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: Cart,
}

fn cart_updated() -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        Redirect::to("/cart"),
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartShowTemplate> {
    Ok(CartShowTemplate {
        cart: load_cart(&session).await?,
    })
}

/// Add a product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .product_by_id(form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let mut cart = load_cart(&session).await?;
    cart.add(product, form.variant.as_deref(), form.quantity.unwrap_or(1))?;
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product", product.slug.as_str()),
            ("variant", form.variant.as_deref().unwrap_or_default()),
        ],
    );
    tracing::info!(product = %product.slug, items = cart.item_count(), "Added to cart");

    Ok(cart_updated())
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(form.product_id, form.variant.as_deref(), form.quantity)?;
    save_cart(&session, &cart).await?;
    Ok(cart_updated())
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = load_cart(&session).await?;
    match cart.remove(form.product_id, form.variant.as_deref()) {
        // Removing twice is harmless.
        Ok(()) | Err(CartError::ItemNotFound) => {}
        Err(e) => return Err(e.into()),
    }
    save_cart(&session, &cart).await?;
    Ok(cart_updated())
}

/// Cart count badge as plain text.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<String> {
    Ok(load_cart(&session).await?.item_count().to_string())
}
