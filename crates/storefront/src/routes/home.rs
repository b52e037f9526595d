//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use shopfront_core::query::{
    self, DisplayProduct, PageRequest, ProductFilter, ProductQuery, SortKey,
};
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

/// Products per home page shelf.
const SHELF_SIZE: u32 = 4;

/// Category tile on the home page.
#[derive(Clone)]
pub struct CategoryTile {
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub product_count: usize,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<DisplayProduct>,
    pub new_arrivals: Vec<DisplayProduct>,
    pub best_sellers: Vec<DisplayProduct>,
    pub categories: Vec<CategoryTile>,
}

fn shelf(state: &AppState, filter: ProductFilter, sort: Option<SortKey>) -> Vec<DisplayProduct> {
    let query = ProductQuery {
        filter,
        sort,
        page: PageRequest::new(Some(1), Some(SHELF_SIZE)),
    };
    query::run(state.catalog().products(), &query).data
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let catalog = state.catalog();

    let featured = shelf(
        &state,
        ProductFilter {
            is_featured: Some(true),
            ..ProductFilter::default()
        },
        None,
    );
    let new_arrivals = shelf(
        &state,
        ProductFilter {
            is_new: Some(true),
            ..ProductFilter::default()
        },
        Some(SortKey::Newest),
    );
    let best_sellers = shelf(
        &state,
        ProductFilter {
            is_best_seller: Some(true),
            ..ProductFilter::default()
        },
        Some(SortKey::Popular),
    );

    let categories = catalog
        .top_level_categories()
        .map(|c| CategoryTile {
            slug: c.slug.clone(),
            name: c.name.clone(),
            image: c.image.clone(),
            product_count: catalog.live_product_count(c.id),
        })
        .collect();

    HomeTemplate {
        featured,
        new_arrivals,
        best_sellers,
        categories,
    }
}
