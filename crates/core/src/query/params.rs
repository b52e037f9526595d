//! Raw listing parameters as they arrive in a query string.
//!
//! Every field is a lenient string so a malformed value drops that one
//! filter instead of rejecting the whole request.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PageRequest, ProductFilter, ProductQuery, SortKey};
use crate::catalog::Catalog;
use crate::types::{BrandId, CategoryId};

/// Query-string shape shared by HTML listings, the JSON API and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Category id or slug.
    pub category: Option<String>,
    /// Brand id or slug.
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub rating: Option<String>,
    pub new: Option<String>,
    pub sale: Option<String>,
    pub best_seller: Option<String>,
    pub featured: Option<String>,
    pub in_stock: Option<String>,
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl QueryParams {
    /// Resolve into a typed query.
    ///
    /// Brand slugs are looked up in `catalog`; an unknown brand slug matches
    /// nothing rather than being ignored.
    #[must_use]
    pub fn into_query(self, catalog: &Catalog, default_limit: u32) -> ProductQuery {
        let mut filter = ProductFilter::default();

        if let Some(category) = non_blank(self.category.as_deref()) {
            match category.parse::<CategoryId>() {
                Ok(id) => filter.category_id = Some(id),
                Err(_) => filter.category_slug = Some(category.to_string()),
            }
        }

        if let Some(brand) = non_blank(self.brand.as_deref()) {
            filter.brand_id = Some(brand.parse::<BrandId>().unwrap_or_else(|_| {
                catalog
                    .brand_by_slug(brand)
                    .map_or(BrandId::new(-1), |b| b.id)
            }));
        }

        filter.min_price = parse_opt::<Decimal>(self.min_price.as_deref());
        filter.max_price = parse_opt::<Decimal>(self.max_price.as_deref());
        filter.min_rating = parse_opt::<f32>(self.rating.as_deref()).filter(|r| r.is_finite());
        filter.is_new = parse_flag(self.new.as_deref());
        filter.is_on_sale = parse_flag(self.sale.as_deref());
        filter.is_best_seller = parse_flag(self.best_seller.as_deref());
        filter.is_featured = parse_flag(self.featured.as_deref());
        filter.in_stock_only = parse_flag(self.in_stock.as_deref()).unwrap_or(false);
        filter.search = non_blank(self.q.as_deref()).map(ToString::to_string);

        ProductQuery {
            filter,
            sort: non_blank(self.sort.as_deref()).and_then(SortKey::parse),
            page: PageRequest::with_default_limit(
                parse_opt(self.page.as_deref()),
                parse_opt(self.limit.as_deref()),
                default_limit,
            ),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_opt<T: FromStr>(value: Option<&str>) -> Option<T> {
    non_blank(value).and_then(|v| v.parse().ok())
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match non_blank(value)?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
