//! Catalog records and the in-memory catalog.
//!
//! Product records are deliberately partial: curated sample data often omits
//! ratings, images or stock information. Display defaults are filled in by
//! [`crate::query::adapter`], never here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId, CategoryStatus, ProductId, StockStatus};

/// A product as held by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub discount_percent: Option<u8>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    /// Image URLs, first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    /// Average rating between 0 and 5.
    pub rating: Option<f32>,
    /// Number of reviews.
    pub reviews: Option<u32>,
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    pub brand_id: Option<BrandId>,
    pub stock_status: Option<StockStatus>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Units sold, used by the "popular" sort.
    pub sold_count: Option<u32>,
    /// Listing date, used by the "newest" sort.
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The stored rating when it is a finite value between 0 and 5.
    ///
    /// Anything else is treated as if no rating were recorded.
    #[must_use]
    pub fn valid_rating(&self) -> Option<f32> {
        self.rating
            .filter(|r| r.is_finite() && (0.0..=5.0).contains(r))
    }

    /// Find a variant by SKU.
    #[must_use]
    pub fn variant(&self, sku: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.sku == sku)
    }
}

/// A purchasable variation of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub sku: String,
    pub color: Option<String>,
    pub size: Option<String>,
    /// Overrides the product price when set.
    pub price: Option<Decimal>,
    /// Units on hand; `None` means untracked.
    pub stock: Option<u32>,
}

impl Variant {
    /// Label shown to shoppers, e.g. "Black / M".
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.color, &self.size) {
            (Some(color), Some(size)) => format!("{color} / {size}"),
            (Some(color), None) => color.clone(),
            (None, Some(size)) => size.clone(),
            (None, None) => self.sku.clone(),
        }
    }

    /// Whether the variant can be purchased.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock != Some(0)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    /// Curated count from the sample data; see [`Catalog::live_product_count`].
    #[serde(default)]
    pub product_count: u32,
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub status: CategoryStatus,
}

impl Category {
    /// Whether the category is shown on the storefront.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub slug: String,
    pub name: String,
}

/// The Mock Data Store: every catalog record, loaded once and read-only.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    brands: Vec<Brand>,
}

impl Catalog {
    /// Build a catalog from its records.
    ///
    /// Products that carry only one of `category_id` / `category_slug` get the
    /// other filled in from the category list, so category filters work
    /// whichever form the caller uses.
    #[must_use]
    pub fn new(mut products: Vec<Product>, categories: Vec<Category>, brands: Vec<Brand>) -> Self {
        for product in &mut products {
            match (product.category_id, product.category_slug.as_deref()) {
                (Some(id), None) => {
                    product.category_slug = categories
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| c.slug.clone());
                }
                (None, Some(slug)) => {
                    product.category_id = categories.iter().find(|c| c.slug == slug).map(|c| c.id);
                }
                _ => {}
            }
        }

        Self {
            products,
            categories,
            brands,
        }
    }

    /// All products in curation order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All categories, including inactive ones.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All brands.
    #[must_use]
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    #[must_use]
    pub fn product_by_id(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    #[must_use]
    pub fn category_by_id(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    #[must_use]
    pub fn brand_by_id(&self, id: BrandId) -> Option<&Brand> {
        self.brands.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn brand_by_slug(&self, slug: &str) -> Option<&Brand> {
        self.brands.iter().find(|b| b.slug == slug)
    }

    /// Active categories without a parent.
    pub fn top_level_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| c.is_active() && c.parent_id.is_none())
    }

    /// Active direct children of a category.
    pub fn children(&self, parent: CategoryId) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |c| c.is_active() && c.parent_id == Some(parent))
    }

    /// Number of products currently assigned to a category.
    #[must_use]
    pub fn live_product_count(&self, category: CategoryId) -> usize {
        self.products
            .iter()
            .filter(|p| p.category_id == Some(category))
            .count()
    }

    /// Other products from the same category, in catalog order.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        let Some(category) = product.category_id else {
            return Vec::new();
        };

        self.products
            .iter()
            .filter(|p| p.id != product.id && p.category_id == Some(category))
            .take(limit)
            .collect()
    }
}
