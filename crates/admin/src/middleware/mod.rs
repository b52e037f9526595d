//! HTTP middleware for admin.
//!
//! Layer order, outermost first: Sentry (added by the binary), `TraceLayer`,
//! request ID, sessions. Authentication happens per handler through the
//! extractors in [`auth`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
