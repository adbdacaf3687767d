//! Paging for list endpoints.
//!
//! Query strings and responses use camelCase (`perPage`, `totalPages`).

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 200;

const DEFAULT_PER_PAGE: u32 = 50;

/// Requested page. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    /// Page number, from 1. `0` reads as the first page.
    pub page: u32,
    /// Rows per page, clamped to `1..=MAX_PER_PAGE`.
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Page `page` of `per_page` rows.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// The effective page number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.page.max(1)
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.number() - 1) * self.limit()
    }

    /// Rows to return.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.clamp(1, MAX_PER_PAGE))
    }
}

/// One page of results plus where it sits in the whole.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    /// Rows of this page.
    pub data: Vec<T>,
    /// Position and totals.
    pub meta: PageMeta,
}

/// Position of a page within the full result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Effective page number.
    pub page: u32,
    /// Effective page size.
    pub per_page: u32,
    /// Rows across all pages.
    pub total: u64,
    /// Number of pages; at least 1.
    pub total_pages: u32,
    /// Whether a later page exists.
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    /// Wraps the rows fetched for `request` out of `total` matches.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        let per_page = request.limit();
        let total_pages = total.div_ceil(per_page).max(1);
        let page = request.number();

        Self {
            data,
            meta: PageMeta {
                page,
                per_page: u32::try_from(per_page).unwrap_or(MAX_PER_PAGE),
                total,
                total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
                has_more: u64::from(page) < total_pages,
            },
        }
    }
}
