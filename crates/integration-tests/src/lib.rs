//! Integration test support for Shopfront.
//!
//! Each test starts the storefront and/or admin router on an ephemeral
//! loopback port inside the test process and talks to it over HTTP with a
//! cookie-keeping `reqwest` client, so sessions behave as in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Files
//!
//! - `catalog_api` - Query pipeline through the storefront JSON API
//! - `storefront_checkout` - Cart and checkout flow across requests
//! - `admin_users` - Admin sign-in, permissions and user management

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use shopfront_admin::{config::AdminConfig, db::AdminStore};
use shopfront_core::fixtures::Fixtures;
use shopfront_storefront::config::StorefrontConfig;

/// A server running in the test process plus a client bound to it.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve `app` on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the client cannot be built.
    pub async fn start(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("test listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Self::client(),
        }
    }

    /// A fresh client: own cookie jar, redirects returned rather than followed.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build test client")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET path` with this server's client.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("send GET")
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Panics
    ///
    /// Panics on a non-success status or a body that is not JSON.
    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        let response = self.get(path).await;
        assert!(response.status().is_success(), "GET {path}: {}", response.status());
        response.json().await.expect("JSON body")
    }
}

/// Start the storefront on the sample fixtures, without the checkout delay.
pub async fn storefront() -> TestServer {
    storefront_with_delay(Duration::ZERO).await
}

/// Start the storefront with a simulated order submission delay.
pub async fn storefront_with_delay(checkout_delay: Duration) -> TestServer {
    let config = StorefrontConfig {
        checkout_delay,
        ..StorefrontConfig::default()
    };
    let catalog = Fixtures::sample().expect("sample fixtures").catalog;
    TestServer::start(shopfront_storefront::app(
        shopfront_storefront::state::AppState::new(config, catalog),
    ))
    .await
}

/// Start the admin console on the sample fixtures.
pub async fn admin() -> TestServer {
    let fixtures = Fixtures::sample().expect("sample fixtures");
    TestServer::start(shopfront_admin::app(shopfront_admin::state::AppState::new(
        AdminConfig::default(),
        fixtures.catalog,
        AdminStore::new(fixtures.admin_users),
    )))
    .await
}
