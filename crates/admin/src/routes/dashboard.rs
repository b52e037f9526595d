//! Dashboard counts.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Serialize;
use shopfront_core::admin::{AdminUser, AdminUserFilter};
use shopfront_core::{AdminRole, AdminStatus, Catalog, StockStatus};
use tracing::instrument;

use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Product counts by stock status.
#[derive(Debug, Default, Serialize)]
pub struct ProductCounts {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

/// Category counts by visibility.
#[derive(Debug, Default, Serialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// Admin user counts. Every role and status is present, zero or not.
#[derive(Debug, Default, Serialize)]
pub struct AdminUserCounts {
    pub total: usize,
    pub by_role: BTreeMap<&'static str, usize>,
    pub by_status: BTreeMap<&'static str, usize>,
}

/// Dashboard response body.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub products: ProductCounts,
    pub categories: CategoryCounts,
    pub admin_users: AdminUserCounts,
}

impl DashboardResponse {
    /// Count everything the dashboard shows.
    #[must_use]
    pub fn build(catalog: &Catalog, users: &[AdminUser]) -> Self {
        let mut products = ProductCounts {
            total: catalog.products().len(),
            ..ProductCounts::default()
        };
        for product in catalog.products() {
            match product.stock_status.unwrap_or_default() {
                StockStatus::InStock => products.in_stock += 1,
                StockStatus::LowStock => products.low_stock += 1,
                StockStatus::OutOfStock => products.out_of_stock += 1,
            }
        }

        let active = catalog.categories().iter().filter(|c| c.is_active()).count();
        let categories = CategoryCounts {
            total: catalog.categories().len(),
            active,
            inactive: catalog.categories().len() - active,
        };

        let by_role = AdminRole::ALL
            .iter()
            .map(|role| (role.as_str(), users.iter().filter(|u| u.role == *role).count()))
            .collect();
        let by_status = [AdminStatus::Active, AdminStatus::Inactive, AdminStatus::Suspended]
            .iter()
            .map(|status| {
                (
                    status.as_str(),
                    users.iter().filter(|u| u.status == *status).count(),
                )
            })
            .collect();

        Self {
            products,
            categories,
            admin_users: AdminUserCounts {
                total: users.len(),
                by_role,
                by_status,
            },
        }
    }
}

/// Dashboard counts. Any signed-in admin may view them.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
) -> Json<DashboardResponse> {
    let users = state
        .store()
        .admin_users()
        .list(&AdminUserFilter::default())
        .await;
    Json(DashboardResponse::build(state.catalog(), &users))
}
