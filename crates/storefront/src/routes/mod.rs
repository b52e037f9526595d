//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product listing
//! GET  /products/{slug}        - Product detail
//! GET  /categories             - Top-level categories
//! GET  /categories/{slug}      - Category listing
//! GET  /best-sellers           - Best seller listing
//! GET  /on-sale                - Sale listing
//! GET  /new-arrivals           - New arrival listing
//! GET  /search?q=              - Search results
//!
//! # JSON API
//! GET  /api/products           - Query the catalog
//! GET  /api/products/{slug}    - Display product
//! GET  /api/categories         - Active categories
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Update quantity
//! POST /cart/remove            - Remove item
//! GET  /cart/count             - Cart count badge (plain text)
//!
//! # Checkout
//! GET  /checkout               - Redirect to the current step
//! GET  /checkout/shipping      - Address and shipping method
//! POST /checkout/shipping
//! GET  /checkout/payment       - Payment method
//! POST /checkout/payment
//! GET  /checkout/review        - Review order
//! POST /checkout/place-order   - Submit order
//! GET  /checkout/success       - Confirmation
//! ```

pub mod api;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod listing;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listing::index))
        .route("/{slug}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(api::catalog::products))
        .route("/products/{slug}", get(api::catalog::product))
        .route("/categories", get(api::catalog::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::start))
        .route(
            "/shipping",
            get(checkout::shipping_page).post(checkout::shipping_submit),
        )
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::payment_submit),
        )
        .route("/review", get(checkout::review_page))
        .route("/place-order", post(checkout::place_order))
        .route("/success", get(checkout::success))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .route("/best-sellers", get(listing::best_sellers))
        .route("/on-sale", get(listing::on_sale))
        .route("/new-arrivals", get(listing::new_arrivals))
        .route("/search", get(listing::search))
        .nest("/api", api_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
