//! Catalog JSON endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shopfront_core::query::{self, DisplayProduct, Facets, QueryParams, QueryResult, adapt};
use shopfront_core::{CategoryId, Category};
use tracing::instrument;

use super::ApiError;
use crate::state::AppState;

/// `GET /api/products` body: the page fields plus facets.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    #[serde(flatten)]
    pub result: QueryResult,
    pub facets: Facets,
}

/// Category with its live product count.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub product_count: usize,
}

impl CategoryResponse {
    fn new(category: &Category, product_count: usize) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            parent_id: category.parent_id,
            product_count,
        }
    }
}

/// Query the catalog.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Json<ProductsResponse> {
    let catalog = state.catalog();
    let query = params.into_query(catalog, state.config().page_size);
    Json(ProductsResponse {
        result: query::run(catalog.products(), &query),
        facets: query::facets(catalog, &query.filter),
    })
}

/// Fetch one display product by slug.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<DisplayProduct>, ApiError> {
    state
        .catalog()
        .product_by_slug(&slug)
        .map(|p| Json(adapt(p)))
        .ok_or_else(|| ApiError::not_found(format!("product {slug} not found")))
}

/// List active categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<Vec<CategoryResponse>> {
    let catalog = state.catalog();
    Json(
        catalog
            .categories()
            .iter()
            .filter(|c| c.is_active())
            .map(|c| CategoryResponse::new(c, catalog.live_product_count(c.id)))
            .collect(),
    )
}
