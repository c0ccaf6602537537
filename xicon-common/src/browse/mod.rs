//! Reader-side browsing: search, tag filters, pages, references, stars
//!
//! Everything here works on an in-memory slice of [`GlossaryEntry`] values
//! already fetched from the access layer.

pub mod export;
pub mod pagination;
pub mod search;
pub mod starred;
pub mod tags;
pub mod video;
pub mod xref;

pub use export::{export_csv, EXPORT_FILENAME, EXPORT_HEADERS};
pub use pagination::{calculate_pagination, PageError, Pager, Pagination, DEFAULT_PAGE_SIZE};
pub use search::{matches_query, rank_by_relevance, search};
pub use starred::{JsonFileStarredStore, MemoryStarredStore, StarredSet, StarredStore};
pub use tags::{TagFilter, TagOperator, EXERCISE_TAGS, STARRED_TAG, VIDEO_TAG};
pub use xref::{parse_definition, render_definition, LookupStack, RenderedSegment, Segment};

use crate::models::GlossaryEntry;
use std::collections::BTreeSet;

/// One browse request
#[derive(Debug, Clone)]
pub struct BrowseQuery {
    pub query: String,
    pub filter: TagFilter,
    pub page: usize,
    pub page_size: usize,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            filter: TagFilter::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of browse results
#[derive(Debug, Clone)]
pub struct BrowsePage<'a> {
    pub items: Vec<&'a GlossaryEntry>,
    pub total_results: usize,
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
}

/// Every entry the query and filter select, in display order
///
/// With a non-blank query results are ranked by relevance; otherwise the
/// input order is kept.
pub fn matching<'a>(
    entries: &'a [GlossaryEntry],
    query: &str,
    filter: &TagFilter,
    starred: &BTreeSet<String>,
) -> Vec<&'a GlossaryEntry> {
    let mut results: Vec<&GlossaryEntry> = search(entries, query)
        .into_iter()
        .filter(|entry| filter.matches(entry, starred))
        .collect();

    if !query.trim().is_empty() {
        rank_by_relevance(&mut results, query);
    }
    results
}

/// Search, filter, order and paginate `entries`
///
/// Out-of-range pages are clamped.
pub fn browse<'a>(
    entries: &'a [GlossaryEntry],
    request: &BrowseQuery,
    starred: &BTreeSet<String>,
) -> BrowsePage<'a> {
    let results = matching(entries, &request.query, &request.filter, starred);

    let total_results = results.len();
    let page_size = request.page_size.max(1);
    let pagination = calculate_pagination(total_results, request.page, page_size);
    let items = results
        .into_iter()
        .skip(pagination.offset)
        .take(page_size)
        .collect();

    BrowsePage {
        items,
        total_results,
        page: pagination.page,
        total_pages: pagination.total_pages,
        page_size,
    }
}
