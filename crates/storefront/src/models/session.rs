//! Session-related types.
//!
//! The cart, the checkout state machine and the most recent order all live
//! in the shopper's session. Nothing is persisted beyond it.

use shopfront_core::cart::Cart;
use shopfront_core::checkout::{CheckoutState, Order};
use tower_sessions::Session;

/// Session keys for shopper data.
pub mod keys {
    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the in-progress checkout.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the order shown on the confirmation page.
    pub const LAST_ORDER: &str = "last_order";
}

/// Load the cart, or an empty one for a new session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Load the checkout state, starting fresh when none is stored.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_checkout(
    session: &Session,
) -> Result<CheckoutState, tower_sessions::session::Error> {
    Ok(session
        .get::<CheckoutState>(keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

/// Store the checkout state.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_checkout(
    session: &Session,
    checkout: &CheckoutState,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CHECKOUT, checkout).await
}

/// Load the most recently placed order.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_last_order(
    session: &Session,
) -> Result<Option<Order>, tower_sessions::session::Error> {
    session.get::<Order>(keys::LAST_ORDER).await
}
