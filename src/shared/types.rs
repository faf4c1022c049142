use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for all list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    /// Get clamped page_size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a filtered listing, plus the totals the client needs to
/// render pagination controls.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page from the fetched slice and the filtered row count.
    ///
    /// An empty result set yields zero pages, not one. Pages past the end
    /// simply carry an empty item list.
    pub fn new(items: Vec<T>, total_items: i64, query: &PaginationQuery) -> Self {
        let page_size = query.limit();
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + page_size - 1) / page_size
        };

        Self {
            page: query.page.max(1),
            page_size,
            total_items,
            total_pages,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, page_size: i64) -> PaginationQuery {
        PaginationQuery { page, page_size }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], 5, &query(1, 2));
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_exact_division() {
        let page = Page::<i32>::new(vec![], 20, &query(2, 10));
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let page = Page::<i32>::new(vec![], 0, &query(1, 10));
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_error() {
        let page = Page::<i32>::new(vec![], 5, &query(9, 10));
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_offset_and_limit() {
        let q = query(3, 10);
        assert_eq!(q.offset(), 20);
        assert_eq!(q.limit(), 10);

        // page below 1 is treated as the first page
        let q = query(0, 10);
        assert_eq!(q.offset(), 0);

        // page_size is clamped to MAX_PAGE_SIZE
        let q = query(2, 1000);
        assert_eq!(q.limit(), MAX_PAGE_SIZE);
        assert_eq!(q.offset(), MAX_PAGE_SIZE);
    }
}
