//! Pagination types for the remote notification list.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
const MAX_PAGE_SIZE: u64 = 100;

/// Request parameters for a paged fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Request for the first page.
    pub fn first(page_size: u64) -> Self {
        Self::new(1, page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Pagination metadata as reported by the remote service.
///
/// Overwritten wholesale by every successful fetch, never inferred locally
/// except for `total_items`, which pushes bump by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Page just fetched (1-based, 0 before any fetch).
    #[serde(rename = "current")]
    pub current_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PageMeta {
    /// Create page metadata.
    pub fn new(current_page: u64, total_pages: u64, total_items: u64, page_size: u64) -> Self {
        Self {
            current_page,
            total_pages,
            total_items,
            page_size,
        }
    }

    /// Whether a page after the current one exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// The page after the current one, if any.
    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then_some(self.current_page + 1)
    }
}

impl Default for PageMeta {
    fn default() -> Self {
        Self::new(0, 0, 0, DEFAULT_PAGE_SIZE)
    }
}

/// One fetched page: metadata plus items, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Pagination metadata for this page.
    pub meta: PageMeta,
    /// The items on this page.
    #[serde(rename = "result")]
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Create a page.
    pub fn new(meta: PageMeta, items: Vec<T>) -> Self {
        Self { meta, items }
    }
}
