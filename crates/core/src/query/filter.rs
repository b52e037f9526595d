//! Filter predicate stage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{BrandId, CategoryId, StockStatus};

/// Filter options for a product listing.
///
/// Every field is optional; an unset field does not constrain the result.
/// Active filters are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    pub brand_id: Option<BrandId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f32>,
    pub is_new: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub is_best_seller: Option<bool>,
    pub is_featured: Option<bool>,
    /// Exclude out-of-stock products when true.
    #[serde(default)]
    pub in_stock_only: bool,
    /// Case-insensitive text to look for in name, descriptions and category.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized_search().is_none()
            && self.active_slug().is_none()
            && self.category_id.is_none()
            && self.brand_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
            && self.is_new.is_none()
            && self.is_on_sale.is_none()
            && self.is_best_seller.is_none()
            && self.is_featured.is_none()
            && !self.in_stock_only
    }

    /// Whether a product satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_with(product, self.normalized_search().as_deref())
    }

    /// Return the matching products, preserving input order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.normalized_search();
        products
            .iter()
            .filter(|p| self.matches_with(p, needle.as_deref()))
            .collect()
    }

    fn matches_with(&self, product: &Product, needle: Option<&str>) -> bool {
        if let Some(id) = self.category_id
            && product.category_id != Some(id)
        {
            return false;
        }

        if let Some(slug) = self.active_slug()
            && product.category_slug.as_deref() != Some(slug)
        {
            return false;
        }

        if let Some(brand) = self.brand_id
            && product.brand_id != Some(brand)
        {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }

        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        if let Some(min) = self.active_min_rating()
            && product.valid_rating().is_none_or(|rating| rating < min)
        {
            return false;
        }

        let flags = [
            (self.is_new, product.is_new),
            (self.is_on_sale, product.is_on_sale),
            (self.is_best_seller, product.is_best_seller),
            (self.is_featured, product.is_featured),
        ];
        if flags
            .iter()
            .any(|(wanted, actual)| wanted.is_some_and(|w| w != *actual))
        {
            return false;
        }

        if self.in_stock_only && product.stock_status == Some(StockStatus::OutOfStock) {
            return false;
        }

        needle.is_none_or(|needle| search_matches(product, needle))
    }

    fn active_slug(&self) -> Option<&str> {
        self.category_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn active_min_rating(&self) -> Option<f32> {
        self.min_rating.filter(|r| r.is_finite())
    }

    fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

fn search_matches(product: &Product, needle: &str) -> bool {
    let fields = [
        Some(product.name.as_str()),
        product.short_description.as_deref(),
        product.description.as_deref(),
        product.category_slug.as_deref(),
    ];

    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::product;
    use crate::types::ProductId;

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let products = vec![product(3, "C", 1), product(1, "A", 2), product(2, "B", 3)];
        let filter = ProductFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(&products)), [3, 1, 2]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let products = vec![
            product(1, "Cheap", 30),
            product(2, "Mid", 75),
            product(3, "Pricey", 120),
            product(4, "Edge", 100),
        ];
        let filter = ProductFilter {
            min_price: Some(Decimal::new(50, 0)),
            max_price: Some(Decimal::new(100, 0)),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&products)), [2, 4]);
    }

    #[test]
    fn test_min_rating_excludes_unrated() {
        let mut rated = product(1, "Rated", 10);
        rated.rating = Some(4.2);
        let mut low = product(2, "Low", 10);
        low.rating = Some(3.9);
        let unrated = product(3, "Unrated", 10);

        let filter = ProductFilter {
            min_rating: Some(4.0),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&[rated, low, unrated])), [1]);
    }

    #[test]
    fn test_nan_rating_is_inactive() {
        let filter = ProductFilter {
            min_rating: Some(f32::NAN),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product(1, "Any", 5)));
    }

    #[test]
    fn test_unusable_rating_fails_min_rating() {
        let mut nan = product(1, "NaN", 10);
        nan.rating = Some(f32::NAN);
        let mut huge = product(2, "Huge", 10);
        huge.rating = Some(9.0);
        let mut good = product(3, "Good", 10);
        good.rating = Some(4.5);

        let filter = ProductFilter {
            min_rating: Some(4.0),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&[nan, huge, good])), [3]);
    }

    #[test]
    fn test_flags_require_exact_value() {
        let mut sale = product(1, "Sale", 10);
        sale.is_on_sale = true;
        let regular = product(2, "Regular", 10);
        let products = [sale, regular];

        let on_sale = ProductFilter {
            is_on_sale: Some(true),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&on_sale.apply(&products)), [1]);

        let not_on_sale = ProductFilter {
            is_on_sale: Some(false),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&not_on_sale.apply(&products)), [2]);
    }

    #[test]
    fn test_category_brand_and_stock() {
        let mut a = product(1, "A", 10);
        a.category_slug = Some("audio".to_string());
        a.brand_id = Some(BrandId::new(7));
        let mut b = product(2, "B", 10);
        b.category_slug = Some("audio".to_string());
        b.brand_id = Some(BrandId::new(7));
        b.stock_status = Some(StockStatus::OutOfStock);
        let mut c = product(3, "C", 10);
        c.category_slug = Some("video".to_string());
        c.brand_id = Some(BrandId::new(7));

        let filter = ProductFilter {
            category_slug: Some("audio".to_string()),
            brand_id: Some(BrandId::new(7)),
            in_stock_only: true,
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&[a, b, c])), [1]);
    }

    #[test]
    fn test_blank_slug_and_search_are_inactive() {
        let filter = ProductFilter {
            category_slug: Some("  ".to_string()),
            search: Some(String::new()),
            ..ProductFilter::default()
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&product(1, "Anything", 1)));
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut by_name = product(1, "Wireless Headphones", 10);
        by_name.description = Some("Over-ear".to_string());
        let mut by_description = product(2, "Studio Monitor", 10);
        by_description.description = Some("Pairs with WIRELESS receivers".to_string());
        let other = product(3, "Desk", 10);

        let filter = ProductFilter {
            search: Some(" wireless ".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&filter.apply(&[by_name, by_description, other])), [1, 2]);
    }

    #[test]
    fn test_every_result_satisfies_every_active_predicate() {
        let products: Vec<Product> = (1..=40)
            .map(|i| {
                let mut p = product(i, &format!("Item {i}"), i64::from(i) * 5);
                p.is_new = i % 2 == 0;
                p.is_on_sale = i % 3 == 0;
                p.rating = (i % 4 != 0).then(|| 2.5 + (i % 5) as f32 * 0.5);
                p.brand_id = Some(BrandId::new(i % 3));
                p
            })
            .collect();

        let filter = ProductFilter {
            min_price: Some(Decimal::new(20, 0)),
            max_price: Some(Decimal::new(160, 0)),
            min_rating: Some(3.0),
            is_new: Some(true),
            brand_id: Some(BrandId::new(1)),
            ..ProductFilter::default()
        };

        let result = filter.apply(&products);
        assert!(!result.is_empty());
        for p in &result {
            assert!(products.iter().any(|q| q.id == p.id));
            assert!(p.price >= Decimal::new(20, 0) && p.price <= Decimal::new(160, 0));
            assert!(p.rating.is_some_and(|r| r >= 3.0));
            assert!(p.is_new);
            assert_eq!(p.brand_id, Some(BrandId::new(1)));
        }
        assert!(!result.iter().any(|p| p.id == ProductId::new(1)));
    }
}
