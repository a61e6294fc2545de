//! Suggestion pagination.

use std::ops::Range;

/// Smallest page the terminal height can produce.
pub const MIN_PAGE_SIZE: usize = 5;

/// Rows taken by the header, help line and prompt around a listing.
pub const CHROME_ROWS: usize = 10;

/// Rows assumed when the terminal size is unknown.
pub const FALLBACK_ROWS: usize = 24;

/// Splits a step's suggestions into fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
}

impl Pager {
    /// Pager with an explicit page size.
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1) }
    }

    /// Pager sized from an explicit setting or the terminal height.
    pub fn from_settings(page_size: Option<usize>, terminal_rows: Option<u16>) -> Self {
        match page_size {
            Some(size) => Self::new(size),
            None => {
                let rows = terminal_rows.map_or(FALLBACK_ROWS, usize::from);
                Self::new(rows.saturating_sub(CHROME_ROWS).max(MIN_PAGE_SIZE))
            }
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Last page for `total` items. An empty list still has one page.
    pub fn max_page(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Clamp a page number into `1..=max_page`.
    pub fn clamp(&self, page: usize, total: usize) -> usize {
        page.clamp(1, self.max_page(total))
    }

    /// Offsets of the items shown on `page`.
    pub fn visible(&self, page: usize, total: usize) -> Range<usize> {
        let page = self.clamp(page, total);
        let start = ((page - 1) * self.page_size).min(total);
        start..(start + self.page_size).min(total)
    }
}
