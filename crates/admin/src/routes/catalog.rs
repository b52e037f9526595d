//! Read-only catalog views for the console.
//!
//! Products go through the same query pipeline as the storefront. Categories
//! include inactive ones, with the stored count beside the live one so
//! drift in the sample data is visible.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use shopfront_core::admin::permissions;
use shopfront_core::query::{self, Facets, PageRequest, QueryParams, QueryResult};
use shopfront_core::{Category, CategoryId, CategoryStatus};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// `GET /api/products` body: the page fields plus facets.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    pub facets: Facets,
}

/// Category row for the console.
#[derive(Debug, Serialize)]
pub struct AdminCategory {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub status: CategoryStatus,
    /// Count recorded in the catalog data.
    pub product_count: u32,
    /// Products assigned to the category right now.
    pub live_product_count: usize,
}

impl AdminCategory {
    fn new(category: &Category, live_product_count: usize) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            name: category.name.clone(),
            parent_id: category.parent_id,
            status: category.status,
            product_count: category.product_count,
            live_product_count,
        }
    }
}

/// Query products.
#[instrument(skip(state, admin))]
pub async fn products(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Query(params): Query<QueryParams>,
) -> Result<Json<ProductsResponse>> {
    admin.require(permissions::PRODUCTS_VIEW)?;

    let catalog = state.catalog();
    let query = params.into_query(catalog, PageRequest::DEFAULT_LIMIT);
    Ok(Json(ProductsResponse {
        result: query::run(catalog.products(), &query),
        facets: query::facets(catalog, &query.filter),
    }))
}

/// List every category, active or not.
#[instrument(skip(state, admin))]
pub async fn categories(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
) -> Result<Json<Vec<AdminCategory>>> {
    admin.require(permissions::CATEGORIES_VIEW)?;

    let catalog = state.catalog();
    Ok(Json(
        catalog
            .categories()
            .iter()
            .map(|c| AdminCategory::new(c, catalog.live_product_count(c.id)))
            .collect(),
    ))
}
