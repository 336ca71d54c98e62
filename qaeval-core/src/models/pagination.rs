//! Pagination types shared by every listing query

use serde::{Deserialize, Serialize};

/// Maximum rows per page
const MAX_PAGE_SIZE: u32 = 100;

/// Default rows per page
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Rows per page (max 100)
    pub page_size: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Page size is clamped to 1..=100
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Ceiling division of a row count into pages. Zero rows is zero pages.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64) as u32
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows for current page
    pub rows: Vec<T>,
    /// Total count across all pages
    pub total_count: u64,
    /// Current page number
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
    /// ceil(total_count / page_size)
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total_count: u64, pagination: Pagination) -> Self {
        Self {
            rows,
            total_count,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: total_pages(total_count, pagination.page_size),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 10);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn clamps_page_and_size() {
        assert_eq!(Pagination::new(0, 10).page, 1);
        assert_eq!(Pagination::new(1, 0).page_size, 1);
        assert_eq!(Pagination::new(1, 999).page_size, 100);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(100, 7), 15);
    }

    #[test]
    fn pages_cover_every_row_exactly_once() {
        let all: Vec<u32> = (0..47).collect();
        let size = 10;
        let pages = total_pages(all.len() as u64, size);

        let mut seen = Vec::new();
        for p in 1..=pages {
            let pg = Pagination::new(p, size);
            let chunk: Vec<u32> = all
                .iter()
                .skip(pg.offset() as usize)
                .take(pg.limit() as usize)
                .copied()
                .collect();
            assert!(chunk.len() <= size as usize);
            seen.extend(chunk);
        }
        assert_eq!(seen, all);
    }

    #[test]
    fn has_next_prev() {
        let page: Page<()> = Page::new(vec![], 30, Pagination::new(1, 10));
        assert!(page.has_next());
        assert!(!page.has_prev());

        let page: Page<()> = Page::new(vec![], 30, Pagination::new(3, 10));
        assert!(!page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn params_default_to_first_page() {
        let p = Pagination::from(PaginationParams::default());
        assert_eq!(p, Pagination::new(1, 10));
    }
}
