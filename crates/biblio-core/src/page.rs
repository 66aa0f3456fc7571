//! Pagination request/response types.

use serde::{Deserialize, Serialize};

/// Default page size when the caller supplies none (or a non-positive one).
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A normalized page request.
///
/// Built from raw caller input via [`PageRequest::of`], which defaults a
/// non-positive size to [`DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: usize,
    /// Page size (always > 0 after normalization).
    pub size: usize,
}

impl PageRequest {
    /// Normalize raw caller input into a page request.
    pub fn of(page: i64, size: i64) -> Self {
        let size = if size > 0 {
            size as usize
        } else {
            DEFAULT_PAGE_SIZE
        };
        let page = page.max(0) as usize;
        Self { page, size }
    }

    /// Offset of the first hit on this page.
    pub fn offset(&self) -> usize {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Zero-based page number.
    pub page: usize,
    /// Page size.
    pub size: usize,
}

impl<T> Page<T> {
    /// Create a page from items and a total count.
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
        }
    }

    /// An empty page for the given request.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Returns `true` if this page carries no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_normalizes_size() {
        assert_eq!(PageRequest::of(0, 0).size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::of(0, -5).size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::of(0, 25).size, 25);
    }

    #[test]
    fn test_page_request_normalizes_page() {
        assert_eq!(PageRequest::of(-3, 10).page, 0);
        assert_eq!(PageRequest::of(2, 10).page, 2);
    }

    #[test]
    fn test_offset_uses_effective_size() {
        // A non-positive size defaults before the offset is computed.
        let req = PageRequest::of(3, 0);
        assert_eq!(req.offset(), 3 * DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_empty_page() {
        let page: Page<String> = Page::empty(PageRequest::of(1, 20));
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.size, 20);
    }
}
