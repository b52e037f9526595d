//! Product listing pages.
//!
//! Every listing (all products, presets, search, category pages) renders the
//! same template from a [`ProductQuery`] run through the query pipeline.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use shopfront_core::query::{
    self, Facets, ProductQuery, QueryParams, QueryResult, SortKey, paginate,
};
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

/// Sort dropdown entry.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Numbered pagination link.
#[derive(Clone)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Subcategory link shown above a category listing.
#[derive(Clone)]
pub struct CategoryLink {
    pub name: String,
    pub href: String,
}

/// Listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub title: String,
    pub description: Option<String>,
    /// Path the filter form and page links submit to.
    pub path: String,
    pub search: String,
    pub result: QueryResult,
    pub facets: Facets,
    pub sort_options: Vec<SortOption>,
    pub page_links: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub subcategories: Vec<CategoryLink>,
}

/// Fixed filters a listing route applies on top of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    All,
    BestSellers,
    OnSale,
    NewArrivals,
}

impl Preset {
    const fn title(self) -> &'static str {
        match self {
            Self::All => "All Products",
            Self::BestSellers => "Best Sellers",
            Self::OnSale => "On Sale",
            Self::NewArrivals => "New Arrivals",
        }
    }

    const fn path(self) -> &'static str {
        match self {
            Self::All => "/products",
            Self::BestSellers => "/best-sellers",
            Self::OnSale => "/on-sale",
            Self::NewArrivals => "/new-arrivals",
        }
    }

    fn apply(self, query: &mut ProductQuery) {
        match self {
            Self::All => {}
            Self::BestSellers => query.filter.is_best_seller = Some(true),
            Self::OnSale => query.filter.is_on_sale = Some(true),
            Self::NewArrivals => {
                query.filter.is_new = Some(true);
                query.sort.get_or_insert(SortKey::Newest);
            }
        }
    }
}

/// Resolve query parameters with the configured page size.
#[must_use]
pub fn resolve(state: &AppState, params: QueryParams) -> ProductQuery {
    params.into_query(state.catalog(), state.config().page_size)
}

/// Run `query` and build the listing page around the result.
#[must_use]
pub fn render(
    state: &AppState,
    title: String,
    path: String,
    params: &QueryParams,
    query: &ProductQuery,
) -> ListingTemplate {
    let catalog = state.catalog();
    let result = query::run(catalog.products(), query);
    listing_page(title, path, params, result, query::facets(catalog, &query.filter))
}

fn listing_page(
    title: String,
    path: String,
    params: &QueryParams,
    result: QueryResult,
    facets: Facets,
) -> ListingTemplate {
    let selected = params.sort.as_deref().and_then(SortKey::parse);
    let sort_options = SortKey::ALL
        .iter()
        .map(|key| SortOption {
            value: key.as_str(),
            label: key.label(),
            selected: Some(*key) == selected,
        })
        .collect();

    let page_links = (1..=result.pages)
        .map(|number| PageLink {
            number,
            href: page_href(&path, params, number),
            current: number == result.page,
        })
        .collect();
    let prev_href = result
        .has_previous()
        .then(|| page_href(&path, params, result.page - 1));
    let next_href = result
        .has_next()
        .then(|| page_href(&path, params, result.page + 1));

    ListingTemplate {
        title,
        description: None,
        search: params.q.clone().unwrap_or_default(),
        path,
        result,
        facets,
        sort_options,
        page_links,
        prev_href,
        next_href,
        subcategories: Vec::new(),
    }
}

/// Link to `page` keeping every other parameter of the request.
#[must_use]
pub fn page_href(path: &str, params: &QueryParams, page: u32) -> String {
    let page = page.to_string();
    let pairs = [
        ("category", params.category.as_deref()),
        ("brand", params.brand.as_deref()),
        ("min_price", params.min_price.as_deref()),
        ("max_price", params.max_price.as_deref()),
        ("rating", params.rating.as_deref()),
        ("new", params.new.as_deref()),
        ("sale", params.sale.as_deref()),
        ("best_seller", params.best_seller.as_deref()),
        ("featured", params.featured.as_deref()),
        ("in_stock", params.in_stock.as_deref()),
        ("q", params.q.as_deref()),
        ("sort", params.sort.as_deref()),
        ("limit", params.limit.as_deref()),
        ("page", Some(page.as_str())),
    ];

    let query: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect();
    format!("{path}?{}", query.join("&"))
}

fn preset_listing(state: &AppState, preset: Preset, params: QueryParams) -> ListingTemplate {
    let mut query = resolve(state, params.clone());
    preset.apply(&mut query);
    render(
        state,
        preset.title().to_string(),
        preset.path().to_string(),
        &params,
        &query,
    )
}

/// All products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ListingTemplate {
    preset_listing(&state, Preset::All, params)
}

/// Best sellers.
#[instrument(skip(state))]
pub async fn best_sellers(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ListingTemplate {
    preset_listing(&state, Preset::BestSellers, params)
}

/// Products on sale.
#[instrument(skip(state))]
pub async fn on_sale(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ListingTemplate {
    preset_listing(&state, Preset::OnSale, params)
}

/// New arrivals, newest first unless another order is requested.
#[instrument(skip(state))]
pub async fn new_arrivals(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ListingTemplate {
    preset_listing(&state, Preset::NewArrivals, params)
}

/// Search results. A blank query shows no products.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ListingTemplate {
    let term = params.q.as_deref().map(str::trim).unwrap_or_default();
    let title = if term.is_empty() {
        "Search".to_string()
    } else {
        format!("Results for \"{term}\"")
    };

    let query = resolve(&state, params.clone());
    if query.filter.search.is_none() {
        return listing_page(
            title,
            "/search".to_string(),
            &params,
            paginate(Vec::new(), query.page),
            Facets::default(),
        );
    }

    render(&state, title, "/search".to_string(), &params, &query)
}
