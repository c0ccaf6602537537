//! Page math for browse results
//!
//! Pages are 1-indexed. An empty result set still has one (empty) page so
//! the current page is always valid.

use std::ops::Range;
use thiserror::Error;

/// Entries per browse page
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Page math for a known result count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
    pub offset: usize,
}

/// Clamp the requested page into range and compute its offset
pub fn calculate_pagination(total_results: usize, requested_page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_pages(total_results, page_size);
    let page = requested_page.clamp(1, total_pages);
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

fn total_pages(total_results: usize, page_size: usize) -> usize {
    total_results.div_ceil(page_size).max(1)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Page must be a number, got {0:?}")]
    NotANumber(String),

    #[error("Page {requested} is out of range (1-{total_pages})")]
    OutOfRange { requested: i64, total_pages: usize },
}

/// Page cursor over a filtered result list
///
/// Invalid jump input is rejected and the current page is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    total_results: usize,
    current: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            total_results: 0,
            current: 1,
        }
    }

    /// Result set changed (search or filter edit): back to page 1
    pub fn reset(&mut self, total_results: usize) {
        self.total_results = total_results;
        self.current = 1;
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_results, self.page_size)
    }

    /// Jump to a page typed by the user
    pub fn goto(&mut self, input: &str) -> Result<usize, PageError> {
        let trimmed = input.trim();
        let requested: i64 = trimmed
            .parse()
            .map_err(|_| PageError::NotANumber(trimmed.to_string()))?;

        let total_pages = self.total_pages();
        if requested < 1 || requested as u64 > total_pages as u64 {
            return Err(PageError::OutOfRange {
                requested,
                total_pages,
            });
        }

        self.current = requested as usize;
        Ok(self.current)
    }

    pub fn next(&mut self) -> usize {
        if self.current < self.total_pages() {
            self.current += 1;
        }
        self.current
    }

    pub fn prev(&mut self) -> usize {
        if self.current > 1 {
            self.current -= 1;
        }
        self.current
    }

    /// Index range of the current page within the result list
    pub fn range(&self) -> Range<usize> {
        let start = (self.current - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_results);
        start.min(end)..end
    }
}
