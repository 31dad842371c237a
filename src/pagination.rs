//! Page/page-size resolution and the paginated result envelope.

use serde::Serialize;

pub const PUBLIC_PAGE_SIZE: usize = 20;
pub const ADMIN_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;

/// Requested slice of an ordered result set. `page` is 1-based.
///
/// The page size is only kept positive here; the configured maximum is
/// applied when the size is resolved from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Rows to skip; saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> usize {
        self.per_page
    }
}

/// Parses a page number; anything missing, non-numeric or below 1 is page 1.
pub fn resolve_page(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(page) if page >= 1 => usize::try_from(page).unwrap_or(usize::MAX),
        _ => 1,
    }
}

/// Parses a page size.
///
/// Missing, non-numeric or non-positive input falls back to `default`;
/// values above `max` are clamped to `max`. A zero `max` is treated as 1.
pub fn resolve_page_size(raw: Option<&str>, default: usize, max: usize) -> usize {
    let max = max.max(1);
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(size) if size >= 1 => usize::try_from(size).unwrap_or(usize::MAX).min(max),
        _ => default.clamp(1, max),
    }
}

/// One page of results plus the metadata needed to render pagination.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: usize) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.per_page,
            total,
            total_pages: total.div_ceil(pagination.per_page),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}
