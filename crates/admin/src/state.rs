//! Application state shared across handlers.

use std::sync::Arc;

use shopfront_core::Catalog;

use crate::config::AdminConfig;
use crate::db::AdminStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog is read-only; admin users live
/// in the [`AdminStore`], which has its own lock.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    catalog: Catalog,
    store: AdminStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, catalog: Catalog, store: AdminStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                store,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the admin store.
    #[must_use]
    pub fn store(&self) -> &AdminStore {
        &self.inner.store
    }
}
