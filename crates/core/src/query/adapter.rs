//! Presentation adapter: partial catalog records to display-ready records.
//!
//! The adapter is a pure function. The same product always adapts to the same
//! display record.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Variant};
use crate::types::{BrandId, CategoryId, Price, ProductId, StockStatus};

/// Rating shown for products without one.
pub const DEFAULT_RATING: f32 = 4.5;

/// Review count shown for products without one.
pub const DEFAULT_REVIEWS: u32 = 0;

/// Base URL of the placeholder image service.
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x600?text=";

/// A fully populated product ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayProduct {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub price: Decimal,
    pub price_display: String,
    pub original_price: Option<Decimal>,
    pub original_price_display: Option<String>,
    pub discount_percent: Option<u8>,
    pub short_description: String,
    pub description: String,
    /// Primary image, never empty.
    pub image: String,
    /// All images, never empty.
    pub images: Vec<String>,
    pub rating: f32,
    pub reviews: u32,
    pub stock_status: StockStatus,
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    pub brand_id: Option<BrandId>,
    pub is_new: bool,
    pub is_best_seller: bool,
    pub is_on_sale: bool,
    pub is_featured: bool,
    pub variants: Vec<Variant>,
    pub specifications: BTreeMap<String, String>,
}

impl DisplayProduct {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        self.stock_status.is_purchasable()
    }
}

impl From<&Product> for DisplayProduct {
    fn from(product: &Product) -> Self {
        adapt(product)
    }
}

/// Placeholder image URL for a product name.
#[must_use]
pub fn placeholder_image(name: &str) -> String {
    format!("{PLACEHOLDER_IMAGE_BASE}{}", urlencoding::encode(name))
}

/// Fill display defaults for a product.
///
/// - missing images: one placeholder built from the name
/// - missing or out-of-range rating: [`DEFAULT_RATING`]; missing reviews: [`DEFAULT_REVIEWS`]
/// - missing stock status: in stock
/// - missing discount: derived from `original_price` when it exceeds `price`
/// - missing short description: the full description
#[must_use]
pub fn adapt(product: &Product) -> DisplayProduct {
    let images: Vec<String> = product
        .images
        .iter()
        .filter(|url| !url.trim().is_empty())
        .cloned()
        .collect();
    let images = if images.is_empty() {
        vec![placeholder_image(&product.name)]
    } else {
        images
    };
    let image = images.first().cloned().unwrap_or_default();

    let description = product.description.clone().unwrap_or_default();
    let short_description = product
        .short_description
        .clone()
        .unwrap_or_else(|| description.clone());

    let original_price = product.original_price.filter(|o| *o > product.price);
    let discount_percent = product
        .discount_percent
        .or_else(|| original_price.and_then(|o| derive_discount(o, product.price)));

    DisplayProduct {
        id: product.id,
        slug: product.slug.clone(),
        name: product.name.clone(),
        price: product.price,
        price_display: Price::usd(product.price).display(),
        original_price,
        original_price_display: original_price.map(|o| Price::usd(o).display()),
        discount_percent,
        short_description,
        description,
        image,
        images,
        rating: product.valid_rating().unwrap_or(DEFAULT_RATING),
        reviews: product.reviews.unwrap_or(DEFAULT_REVIEWS),
        stock_status: product.stock_status.unwrap_or_default(),
        category_id: product.category_id,
        category_slug: product.category_slug.clone(),
        brand_id: product.brand_id,
        is_new: product.is_new,
        is_best_seller: product.is_best_seller,
        is_on_sale: product.is_on_sale,
        is_featured: product.is_featured,
        variants: product.variants.clone(),
        specifications: product.specifications.clone(),
    }
}

fn derive_discount(original: Decimal, price: Decimal) -> Option<u8> {
    if original <= Decimal::ZERO {
        return None;
    }
    ((original - price) / original * Decimal::ONE_HUNDRED)
        .round()
        .to_u8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::product;

    #[test]
    fn test_defaults_for_bare_record() {
        let display = adapt(&product(1, "Canvas Tote", 25));
        assert_eq!(display.image, "https://placehold.co/600x600?text=Canvas%20Tote");
        assert_eq!(display.images, [display.image.clone()]);
        assert!((display.rating - DEFAULT_RATING).abs() < f32::EPSILON);
        assert_eq!(display.reviews, DEFAULT_REVIEWS);
        assert_eq!(display.stock_status, StockStatus::InStock);
        assert_eq!(display.price_display, "$25.00");
        assert_eq!(display.discount_percent, None);
    }

    #[test]
    fn test_unusable_rating_uses_default() {
        let mut p = product(6, "Kettle", 30);
        p.rating = Some(f32::NAN);
        assert!((adapt(&p).rating - DEFAULT_RATING).abs() < f32::EPSILON);
    }

    #[test]
    fn test_adapt_is_deterministic() {
        let p = product(9, "Desk Lamp", 40);
        assert_eq!(adapt(&p), adapt(&p));
    }

    #[test]
    fn test_existing_fields_are_kept() {
        let mut p = product(2, "Boots", 120);
        p.images = vec![String::new(), "https://cdn.test/boots.jpg".to_string()];
        p.rating = Some(3.8);
        p.reviews = Some(212);
        p.stock_status = Some(StockStatus::LowStock);
        p.short_description = Some("Waterproof".to_string());

        let display = adapt(&p);
        assert_eq!(display.image, "https://cdn.test/boots.jpg");
        assert_eq!(display.images.len(), 1);
        assert!((display.rating - 3.8).abs() < f32::EPSILON);
        assert_eq!(display.reviews, 212);
        assert_eq!(display.stock_status, StockStatus::LowStock);
        assert_eq!(display.short_description, "Waterproof");
    }

    #[test]
    fn test_discount_derived_from_original_price() {
        let mut p = product(3, "Jacket", 75);
        p.original_price = Some(Decimal::new(100, 0));
        let display = adapt(&p);
        assert_eq!(display.discount_percent, Some(25));
        assert_eq!(display.original_price_display.as_deref(), Some("$100.00"));
    }

    #[test]
    fn test_original_price_below_price_is_dropped() {
        let mut p = product(4, "Scarf", 30);
        p.original_price = Some(Decimal::new(20, 0));
        let display = adapt(&p);
        assert_eq!(display.original_price, None);
        assert_eq!(display.discount_percent, None);
    }

    #[test]
    fn test_short_description_falls_back_to_description() {
        let mut p = product(5, "Mug", 12);
        p.description = Some("Stoneware, 350ml".to_string());
        assert_eq!(adapt(&p).short_description, "Stoneware, 350ml");
    }
}
