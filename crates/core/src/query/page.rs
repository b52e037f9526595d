//! Pagination stage.

use serde::{Deserialize, Serialize};

/// A validated page request (`page >= 1`, `0 < limit <= MAX_LIMIT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Listing page size when none is requested.
    pub const DEFAULT_LIMIT: u32 = 12;
    /// Largest page size a caller may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Normalize raw request values.
    ///
    /// A missing or zero page becomes 1; a missing or zero limit becomes
    /// [`Self::DEFAULT_LIMIT`]; limits above [`Self::MAX_LIMIT`] are capped.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self::with_default_limit(page, limit, Self::DEFAULT_LIMIT)
    }

    /// Like [`Self::new`] but with a caller-chosen default page size.
    #[must_use]
    pub fn with_default_limit(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let default_limit = default_limit.clamp(1, Self::MAX_LIMIT);
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            limit: limit
                .filter(|l| *l > 0)
                .unwrap_or(default_limit)
                .min(Self::MAX_LIMIT),
        }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Index of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

/// One page of results plus totals.
///
/// Serializes as `{data, total, page, pages}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Number of items across all pages.
    pub total: usize,
    /// The 1-based page number that was requested.
    pub page: u32,
    /// Total number of pages, `ceil(total / limit)`.
    pub pages: u32,
}

impl<T> Page<T> {
    /// Transform every item on the page.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            pages: self.pages,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Slice `items` to the requested page window.
///
/// Pages past the end yield an empty `data` vector rather than an error.
#[must_use]
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let pages = u32::try_from(total.div_ceil(request.limit as usize)).unwrap_or(u32::MAX);
    let data = items
        .into_iter()
        .skip(request.offset())
        .take(request.limit as usize)
        .collect();

    Page {
        data,
        total,
        page: request.page,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_five_items_limit_twelve() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), PageRequest::new(Some(1), Some(12)));
        assert_eq!(first.data.len(), 12);
        assert_eq!(first.pages, 3);
        assert_eq!(first.total, 25);

        let third = paginate(items, PageRequest::new(Some(3), Some(12)));
        assert_eq!(third.data, [25]);
        assert!(!third.has_next());
        assert!(third.has_previous());
    }

    #[test]
    fn test_page_past_end_is_empty() {
        for limit in 1..=30 {
            let items: Vec<u32> = (0..17).collect();
            let page = paginate(items, PageRequest::new(Some(50), Some(limit)));
            assert!(page.data.is_empty());
            assert_eq!(page.pages, 17u32.div_ceil(limit));
        }
    }

    #[test]
    fn test_empty_collection_has_zero_pages() {
        let page = paginate(Vec::<u8>::new(), PageRequest::default());
        assert_eq!(page.pages, 0);
        assert_eq!(page.total, 0);
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_repeated_request_is_identical() {
        let items: Vec<u32> = (0..40).collect();
        let request = PageRequest::new(Some(2), Some(7));
        assert_eq!(
            paginate(items.clone(), request),
            paginate(items, request)
        );
    }

    #[test]
    fn test_request_normalization() {
        let request = PageRequest::new(Some(0), Some(0));
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), PageRequest::DEFAULT_LIMIT);

        let capped = PageRequest::new(None, Some(10_000));
        assert_eq!(capped.limit(), PageRequest::MAX_LIMIT);

        let custom = PageRequest::with_default_limit(None, None, 24);
        assert_eq!(custom.limit(), 24);
        assert_eq!(custom.offset(), 0);
    }

    #[test]
    fn test_map_keeps_totals() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(1), Some(2))).map(|n| n * 10);
        assert_eq!(page.data, [10, 20]);
        assert_eq!(page.pages, 2);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_serialized_shape() {
        let page = paginate(vec!["a"], PageRequest::default());
        let json = serde_json::to_value(&page).unwrap_or_default();
        assert_eq!(json["data"][0], "a");
        assert_eq!(json["total"], 1);
        assert_eq!(json["page"], 1);
        assert_eq!(json["pages"], 1);
    }
}
