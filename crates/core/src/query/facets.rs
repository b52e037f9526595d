//! Facet counts for listing sidebars.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::ProductFilter;
use crate::catalog::{Catalog, Product};
use crate::types::{BrandId, StockStatus};

/// A facet value and the number of products carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Aggregates over a filtered product set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub categories: Vec<FacetCount>,
    pub brands: Vec<FacetCount>,
    pub in_stock: usize,
    pub out_of_stock: usize,
}

impl Facets {
    /// Compute facets for `products`, labelling keys from the catalog.
    ///
    /// Products without a category or brand are left out of those counts.
    /// Unknown stock status counts as in stock, matching the adapter.
    #[must_use]
    pub fn compute(catalog: &Catalog, products: &[&Product]) -> Self {
        let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
        let mut brands: BTreeMap<BrandId, usize> = BTreeMap::new();
        let mut facets = Self::default();

        for product in products {
            facets.min_price = Some(
                facets
                    .min_price
                    .map_or(product.price, |m| m.min(product.price)),
            );
            facets.max_price = Some(
                facets
                    .max_price
                    .map_or(product.price, |m| m.max(product.price)),
            );

            if let Some(slug) = product.category_slug.as_deref() {
                *categories.entry(slug).or_default() += 1;
            }
            if let Some(brand) = product.brand_id {
                *brands.entry(brand).or_default() += 1;
            }

            if product.stock_status == Some(StockStatus::OutOfStock) {
                facets.out_of_stock += 1;
            } else {
                facets.in_stock += 1;
            }
        }

        facets.categories = categories
            .into_iter()
            .map(|(slug, count)| FacetCount {
                key: slug.to_string(),
                label: catalog
                    .category_by_slug(slug)
                    .map_or_else(|| slug.to_string(), |c| c.name.clone()),
                count,
            })
            .collect();

        facets.brands = brands
            .into_iter()
            .map(|(id, count)| {
                let brand = catalog.brand_by_id(id);
                FacetCount {
                    key: brand.map_or_else(|| id.to_string(), |b| b.slug.clone()),
                    label: brand.map_or_else(|| id.to_string(), |b| b.name.clone()),
                    count,
                }
            })
            .collect();

        facets
    }
}

/// Facets for the catalog products matching `filter`.
#[must_use]
pub fn facets(catalog: &Catalog, filter: &ProductFilter) -> Facets {
    Facets::compute(catalog, &filter.apply(catalog.products()))
}
