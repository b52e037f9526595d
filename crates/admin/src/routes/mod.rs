//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Health check (in lib.rs)
//!
//! # Auth (mock sign-in by email)
//! POST   /auth/login                      - Sign in as an active admin
//! POST   /auth/logout                     - Sign out
//!
//! # Console API (signed-in admins)
//! GET    /api/me                          - Current admin
//! GET    /api/dashboard                   - Catalog and team counts
//! GET    /api/admin-users                 - List admin users (users.view)
//! POST   /api/admin-users                 - Create admin user (users.manage)
//! GET    /api/admin-users/{id}            - Admin user detail (users.view)
//! PATCH  /api/admin-users/{id}            - Update admin user (users.manage)
//! DELETE /api/admin-users/{id}            - Delete admin user (users.manage)
//! GET    /api/admin-users/{id}/activity   - Audit trail (users.view)
//! GET    /api/products                    - Product query (products.view)
//! GET    /api/categories                  - All categories (categories.view)
//! ```

pub mod admin_users;
pub mod auth;
pub mod catalog;
pub mod dashboard;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router (without the health check and layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .route("/dashboard", get(dashboard::show))
        .route(
            "/admin-users",
            get(admin_users::index).post(admin_users::create),
        )
        .route(
            "/admin-users/{id}",
            get(admin_users::show)
                .patch(admin_users::update)
                .delete(admin_users::delete),
        )
        .route("/admin-users/{id}/activity", get(admin_users::activity))
        .route("/products", get(catalog::products))
        .route("/categories", get(catalog::categories))
}
