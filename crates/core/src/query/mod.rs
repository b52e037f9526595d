//! Product query pipeline.
//!
//! A listing request runs four stages in a fixed order:
//!
//! 1. [`filter`]: keep products matching every active predicate
//! 2. [`sort`]: reorder by the requested key (stable)
//! 3. [`page`]: cut the requested window and count totals
//! 4. [`adapter`]: fill display defaults for the records on the page
//!
//! Pagination always runs on the filtered and sorted set, so `total` counts
//! matches rather than the whole catalog.

pub mod adapter;
pub mod facets;
pub mod filter;
pub mod page;
pub mod params;
pub mod sort;

use serde::Serialize;

pub use adapter::{DisplayProduct, adapt};
pub use facets::{FacetCount, Facets, facets};
pub use filter::ProductFilter;
pub use page::{Page, PageRequest, paginate};
pub use params::QueryParams;
pub use sort::{SortKey, sort_products};

use crate::catalog::Product;

/// A complete listing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    /// `None` keeps catalog order.
    pub sort: Option<SortKey>,
    pub page: PageRequest,
}

/// Result of [`run`]: one page of display-ready products.
pub type QueryResult = Page<DisplayProduct>;

/// Filter and sort without paginating.
#[must_use]
pub fn select<'a>(products: &'a [Product], query: &ProductQuery) -> Vec<&'a Product> {
    let mut selected = query.filter.apply(products);
    if let Some(key) = query.sort {
        sort_products(&mut selected, key);
    }
    selected
}

/// Run the full pipeline over `products`.
#[must_use]
pub fn run(products: &[Product], query: &ProductQuery) -> QueryResult {
    paginate(select(products, query), query.page).map(adapt)
}
