//! Sort stage.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Product listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
    Popular,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Every sort key, in the order listing pages offer them.
    pub const ALL: [Self; 7] = [
        Self::Popular,
        Self::Newest,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Rating,
        Self::NameAsc,
        Self::NameDesc,
    ];

    /// Parse from a URL parameter value.
    ///
    /// Returns `None` for unrecognized values, which leaves the order
    /// untouched.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "newest" | "new" => Some(Self::Newest),
            "price-low" | "price-asc" | "price_asc" | "price-ascending" => Some(Self::PriceLow),
            "price-high" | "price-desc" | "price_desc" | "price-descending" => {
                Some(Self::PriceHigh)
            }
            "rating" | "top-rated" => Some(Self::Rating),
            "popular" | "best-selling" => Some(Self::Popular),
            "name-asc" | "name" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Popular => "popular",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    /// Label for sort dropdowns.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Rating => "Top Rated",
            Self::Popular => "Most Popular",
            Self::NameAsc => "Name: A to Z",
            Self::NameDesc => "Name: Z to A",
        }
    }

    /// Compare two products under this key.
    ///
    /// Keys that read optional fields (`newest`, `popular`, `rating`) order
    /// records lacking the field after every record that has it.
    #[must_use]
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Newest => descending_present_first(a.created_at, b.created_at),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Rating => match (a.valid_rating(), b.valid_rating()) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Popular => descending_present_first(a.sold_count, b.sold_count),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
        }
    }
}

fn descending_present_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort products in place. The sort is stable.
pub fn sort_products(products: &mut [&Product], key: SortKey) {
    products.sort_by(|a, b| key.compare(a, b));
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::catalog::test_support::product;

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_parse_aliases_and_unknown() {
        assert_eq!(SortKey::parse("price_asc"), Some(SortKey::PriceLow));
        assert_eq!(SortKey::parse("price-descending"), Some(SortKey::PriceHigh));
        assert_eq!(SortKey::parse("best-selling"), Some(SortKey::Popular));
        assert_eq!(SortKey::parse("relevance"), None);
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_price_low_reversed_equals_price_high() {
        let products: Vec<Product> = [40, 15, 99, 7, 63]
            .iter()
            .enumerate()
            .map(|(i, price)| product(i32::try_from(i).unwrap_or(0), "P", *price))
            .collect();

        let mut low: Vec<&Product> = products.iter().collect();
        sort_products(&mut low, SortKey::PriceLow);
        let mut high: Vec<&Product> = products.iter().collect();
        sort_products(&mut high, SortKey::PriceHigh);

        low.reverse();
        assert_eq!(ids(&low), ids(&high));
    }

    #[test]
    fn test_popular_puts_missing_sold_count_last_stably() {
        let mut a = product(1, "A", 1);
        a.sold_count = Some(5);
        let b = product(2, "B", 1);
        let mut c = product(3, "C", 1);
        c.sold_count = Some(50);
        let d = product(4, "D", 1);
        let products = [a, b, c, d];

        let mut sorted: Vec<&Product> = products.iter().collect();
        sort_products(&mut sorted, SortKey::Popular);
        assert_eq!(ids(&sorted), [3, 1, 2, 4]);
    }

    #[test]
    fn test_newest_orders_by_created_at_desc() {
        let mut old = product(1, "Old", 1);
        old.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let mut new = product(2, "New", 1);
        new.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single();
        let undated = product(3, "Undated", 1);
        let products = [undated, old, new];

        let mut sorted: Vec<&Product> = products.iter().collect();
        sort_products(&mut sorted, SortKey::Newest);
        assert_eq!(ids(&sorted), [2, 1, 3]);
    }

    #[test]
    fn test_rating_and_name_sorts() {
        let mut a = product(1, "banana", 1);
        a.rating = Some(3.5);
        let mut b = product(2, "Apple", 1);
        b.rating = Some(4.8);
        let c = product(3, "cherry", 1);
        let products = [a, b, c];

        let mut by_rating: Vec<&Product> = products.iter().collect();
        sort_products(&mut by_rating, SortKey::Rating);
        assert_eq!(ids(&by_rating), [2, 1, 3]);

        let mut by_name: Vec<&Product> = products.iter().collect();
        sort_products(&mut by_name, SortKey::NameAsc);
        assert_eq!(ids(&by_name), [2, 1, 3]);

        sort_products(&mut by_name, SortKey::NameDesc);
        assert_eq!(ids(&by_name), [3, 1, 2]);
    }

    #[test]
    fn test_unusable_rating_sorts_with_unrated() {
        let mut nan = product(1, "NaN", 1);
        nan.rating = Some(f32::NAN);
        let mut rated = product(2, "Rated", 1);
        rated.rating = Some(2.0);
        let unrated = product(3, "Unrated", 1);
        let mut negative = product(4, "Negative", 1);
        negative.rating = Some(-1.0);
        let products = [nan, rated, unrated, negative];

        let mut sorted: Vec<&Product> = products.iter().collect();
        sort_products(&mut sorted, SortKey::Rating);
        assert_eq!(ids(&sorted), [2, 1, 3, 4]);
    }
}
