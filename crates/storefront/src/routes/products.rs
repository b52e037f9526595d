//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use shopfront_core::Category;
use shopfront_core::query::{DisplayProduct, adapt};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Number of related products shown under the detail.
const RELATED_LIMIT: usize = 4;

/// Variant display data for templates.
#[derive(Clone)]
pub struct VariantView {
    pub sku: String,
    pub label: String,
    pub price: String,
    pub in_stock: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: DisplayProduct,
    pub variants: Vec<VariantView>,
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub related: Vec<DisplayProduct>,
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let catalog = state.catalog();
    let product = catalog
        .product_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let display = adapt(product);
    let variants = product
        .variants
        .iter()
        .map(|v| VariantView {
            sku: v.sku.clone(),
            label: v.label(),
            price: v.price.map_or_else(
                || display.price_display.clone(),
                |p| shopfront_core::Price::usd(p).display(),
            ),
            in_stock: display.is_purchasable() && v.in_stock(),
        })
        .collect();

    Ok(ProductShowTemplate {
        variants,
        category: product
            .category_id
            .and_then(|id| catalog.category_by_id(id))
            .cloned(),
        brand: product
            .brand_id
            .and_then(|id| catalog.brand_by_id(id))
            .map(|b| b.name.clone()),
        related: catalog
            .related(product, RELATED_LIMIT)
            .into_iter()
            .map(adapt)
            .collect(),
        product: display,
    })
}
