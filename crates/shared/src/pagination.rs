//! Offset pagination utilities.

use serde::Serialize;

/// A normalized page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Builds a page request from optional query values.
    ///
    /// Missing or zero values fall back to page 1 and `default_per_page`;
    /// `per_page` is capped at `max_per_page`.
    pub fn new(
        page: Option<u32>,
        per_page: Option<u32>,
        default_per_page: u32,
        max_per_page: u32,
    ) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let per_page = per_page
            .filter(|p| *p > 0)
            .unwrap_or(default_per_page)
            .min(max_per_page.max(1));
        Self { page, per_page }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Number of rows to return.
    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = request.per_page.max(1) as u64;
        let total_pages = total.div_ceil(per_page) as u32;
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages,
        }
    }

    /// Converts the items while keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::new(None, None, 20, 100);
        assert_eq!(req, PageRequest { page: 1, per_page: 20 });
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_page_request_zero_values_fall_back() {
        let req = PageRequest::new(Some(0), Some(0), 25, 100);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 25);
    }

    #[test]
    fn test_page_request_caps_per_page() {
        let req = PageRequest::new(Some(3), Some(1000), 20, 100);
        assert_eq!(req.per_page, 100);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn test_page_total_pages() {
        let req = PageRequest::new(Some(1), Some(10), 20, 100);
        let page = Page::new(vec![1, 2, 3], 21, req);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], 0, req);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let req = PageRequest::new(Some(2), Some(2), 20, 100);
        let page = Page::new(vec![1, 2], 4, req).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_page_serialization() {
        let page = Page::new(vec!["a"], 1, PageRequest::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["perPage"], 20);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["items"][0], "a");
    }
}
