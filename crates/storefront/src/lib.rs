//! Shopfront Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the storefront router with sessions, request IDs and tracing.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
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
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use shopfront_core::fixtures::Fixtures;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        let config = StorefrontConfig {
            checkout_delay: Duration::ZERO,
            ..StorefrontConfig::default()
        };
        app(AppState::new(config, Fixtures::sample().unwrap().catalog))
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json(uri: &str) -> serde_json::Value {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn test_html_pages_render() {
        for uri in [
            "/",
            "/products",
            "/products?sort=price-low&page=2",
            "/categories",
            "/categories/audio",
            "/best-sellers",
            "/on-sale",
            "/new-arrivals",
            "/search?q=wool",
            "/search",
            "/products/aurora-wireless-headphones",
            "/cart",
        ] {
            let response = get(uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        }
    }

    #[tokio::test]
    async fn test_unknown_slugs_are_not_found() {
        assert_eq!(get("/products/no-such-thing").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/categories/no-such-thing").await.status(), StatusCode::NOT_FOUND);
        // Inactive categories are hidden.
        assert_eq!(get("/categories/accessories").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/api/products/no-such-thing").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_products_paginates() {
        let body = json("/api/products?limit=12&page=3").await;
        assert_eq!(body["total"], 30);
        assert_eq!(body["pages"], 3);
        assert_eq!(body["page"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
        assert!(body["facets"]["categories"].is_array());
    }

    #[tokio::test]
    async fn test_api_products_filters_by_category() {
        let body = json("/api/products?category=audio").await;
        assert_eq!(body["total"], 5);
        for product in body["data"].as_array().unwrap() {
            assert_eq!(product["category_slug"], "audio");
        }
    }

    #[tokio::test]
    async fn test_api_product_fills_defaults() {
        let body = json("/api/products/wool-beanie").await;
        assert_eq!(body["price_display"], "$25.00");
        assert!(!body["image"].as_str().unwrap().is_empty());
        assert_eq!(body["stock_status"], "in_stock");
    }

    #[tokio::test]
    async fn test_api_categories_are_active_only() {
        let body = json("/api/categories").await;
        let slugs: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs.len(), 7);
        assert!(!slugs.contains(&"accessories"));
    }

    #[tokio::test]
    async fn test_new_session_cart_count_is_zero() {
        let response = get("/cart/count").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "0");
    }

    #[tokio::test]
    async fn test_add_to_cart_redirects() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cart/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("product_id=14&quantity=2"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/cart");
        assert_eq!(response.headers()["hx-trigger"], "cart-updated");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_add_out_of_stock_conflicts() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cart/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("product_id=5"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_goes_to_cart() {
        let response = get("/checkout").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/cart");

        let response = get("/checkout/review").await;
        assert_eq!(response.headers()[header::LOCATION], "/cart");

        let response = get("/checkout/success").await;
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
