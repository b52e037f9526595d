//! Shopfront Admin library.
//!
//! This crate provides the admin console API as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! Sign-in is a mock that trusts the posted email of an active admin.
//! Bind to a private interface only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Build the admin router with sessions, request IDs and tracing.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use shopfront_core::fixtures::Fixtures;
    use tower::ServiceExt;

    use super::*;
    use crate::config::AdminConfig;
    use crate::db::AdminStore;

    fn test_app() -> Router {
        let fixtures = Fixtures::sample().unwrap();
        app(AppState::new(
            AdminConfig::default(),
            fixtures.catalog,
            AdminStore::new(fixtures.admin_users),
        ))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Sign in and return the session cookie pair.
    async fn login(app: &Router, email: &str) -> String {
        let response = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("SameSite=Strict"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_api_requires_sign_in() {
        let app = test_app();
        for uri in ["/api/me", "/api/dashboard", "/api/admin-users", "/api/products"] {
            let response = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let app = test_app();
        let attempt = |email: &'static str| {
            let app = app.clone();
            async move {
                send(
                    &app,
                    Method::POST,
                    "/auth/login",
                    None,
                    Some(json!({ "email": email })),
                )
                .await
                .status()
            }
        };
        assert_eq!(attempt("nobody@shopfront.test").await, StatusCode::UNAUTHORIZED);
        assert_eq!(attempt("jamie@shopfront.test").await, StatusCode::FORBIDDEN);
        assert_eq!(attempt("not-an-email").await, StatusCode::BAD_REQUEST);

        let cookie = login(&app, "Riley@Shopfront.test").await;
        let me = json_body(send(&app, Method::GET, "/api/me", Some(&cookie), None).await).await;
        assert_eq!(me["email"], "riley@shopfront.test");
        assert_eq!(me["role"], "manager");
        assert!(
            me["effective_permissions"]
                .as_array()
                .unwrap()
                .contains(&json!("orders.manage"))
        );
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = test_app();
        let cookie = login(&app, "morgan@shopfront.test").await;

        let response = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, "/api/me", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_permission_gates() {
        let app = test_app();
        let casey = login(&app, "casey@shopfront.test").await;

        let response = send(&app, Method::GET, "/api/admin-users", Some(&casey), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("users.view"));

        let response = send(&app, Method::GET, "/api/products", Some(&casey), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/api/dashboard", Some(&casey), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_admin_users() {
        let app = test_app();
        let cookie = login(&app, "morgan@shopfront.test").await;

        let page = json_body(
            send(&app, Method::GET, "/api/admin-users?limit=4&page=2", Some(&cookie), None).await,
        )
        .await;
        assert_eq!(page["total"], 6);
        assert_eq!(page["pages"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 2);

        let editors = json_body(
            send(&app, Method::GET, "/api/admin-users?role=editor", Some(&cookie), None).await,
        )
        .await;
        assert_eq!(editors["total"], 2);

        let response =
            send(&app, Method::GET, "/api/admin-users?role=owner", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_user_lifecycle() {
        let app = test_app();
        let cookie = login(&app, "morgan@shopfront.test").await;

        let response = send(
            &app,
            Method::POST,
            "/api/admin-users",
            Some(&cookie),
            Some(json!({ "name": "Sam Rivera", "email": "sam@shopfront.test", "role": "viewer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["id"], 7);
        assert_eq!(created["status"], "active");

        let response = send(
            &app,
            Method::PATCH,
            "/api/admin-users/7",
            Some(&cookie),
            Some(json!({ "role": "editor" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["role"], "editor");

        let response = send(&app, Method::DELETE, "/api/admin-users/7", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, Method::GET, "/api/admin-users/7", Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let activity = json_body(
            send(&app, Method::GET, "/api/admin-users/2/activity", Some(&cookie), None).await,
        )
        .await;
        let actions: Vec<&str> = activity
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec![
                "admin_user.deleted",
                "admin_user.updated",
                "admin_user.created",
                "auth.login"
            ]
        );
    }

    #[tokio::test]
    async fn test_super_admin_protections() {
        let app = test_app();
        let morgan = login(&app, "morgan@shopfront.test").await;
        let response = send(&app, Method::DELETE, "/api/admin-users/1", Some(&morgan), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let avery = login(&app, "avery@shopfront.test").await;
        let response = send(&app, Method::DELETE, "/api/admin-users/1", Some(&avery), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(
            &app,
            Method::PATCH,
            "/api/admin-users/1",
            Some(&avery),
            Some(json!({ "role": "admin" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_deactivated_admin_loses_access() {
        let app = test_app();
        let riley = login(&app, "riley@shopfront.test").await;
        let morgan = login(&app, "morgan@shopfront.test").await;

        let response = send(
            &app,
            Method::PATCH,
            "/api/admin-users/3",
            Some(&morgan),
            Some(json!({ "status": "suspended" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/api/me", Some(&riley), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_catalog_views() {
        let app = test_app();
        let cookie = login(&app, "riley@shopfront.test").await;

        let products = json_body(
            send(&app, Method::GET, "/api/products?limit=10&page=3", Some(&cookie), None).await,
        )
        .await;
        assert_eq!(products["total"], 30);
        assert_eq!(products["pages"], 3);
        assert_eq!(products["data"].as_array().unwrap().len(), 10);

        let categories =
            json_body(send(&app, Method::GET, "/api/categories", Some(&cookie), None).await).await;
        let categories = categories.as_array().unwrap();
        assert_eq!(categories.len(), 8);
        assert!(categories.iter().any(|c| c["status"] == "inactive"));
        assert!(categories.iter().all(|c| c["live_product_count"].is_u64()));
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let app = test_app();
        let cookie = login(&app, "casey@shopfront.test").await;
        let dashboard =
            json_body(send(&app, Method::GET, "/api/dashboard", Some(&cookie), None).await).await;
        assert_eq!(dashboard["products"]["total"], 30);
        assert_eq!(dashboard["categories"]["total"], 8);
        assert_eq!(dashboard["admin_users"]["by_status"]["inactive"], 1);
    }
}
