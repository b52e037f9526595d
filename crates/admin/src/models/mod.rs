//! Session models for admin.
//!
//! Admin user records themselves live in `shopfront_core::admin`.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
