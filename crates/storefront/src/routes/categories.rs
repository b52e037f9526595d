//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use shopfront_core::query::QueryParams;
use tracing::instrument;

use super::home::CategoryTile;
use super::listing::{self, CategoryLink, ListingTemplate};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Category index template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryTile>,
}

/// Display active top-level categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> CategoriesIndexTemplate {
    let catalog = state.catalog();
    CategoriesIndexTemplate {
        categories: catalog
            .top_level_categories()
            .map(|c| CategoryTile {
                slug: c.slug.clone(),
                name: c.name.clone(),
                image: c.image.clone(),
                product_count: catalog.live_product_count(c.id),
            })
            .collect(),
    }
}

/// Display one category's products.
///
/// Inactive categories are hidden from shoppers and render 404.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<QueryParams>,
) -> Result<ListingTemplate> {
    let catalog = state.catalog();
    let category = catalog
        .category_by_slug(&slug)
        .filter(|c| c.is_active())
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let mut query = listing::resolve(&state, params.clone());
    query.filter.category_id = None;
    query.filter.category_slug = Some(category.slug.clone());

    let mut page = listing::render(
        &state,
        category.name.clone(),
        format!("/categories/{}", category.slug),
        &params,
        &query,
    );
    page.description = Some(category.description.clone()).filter(|d| !d.is_empty());
    page.subcategories = catalog
        .children(category.id)
        .map(|child| CategoryLink {
            name: child.name.clone(),
            href: format!("/categories/{}", child.slug),
        })
        .collect();

    Ok(page)
}
