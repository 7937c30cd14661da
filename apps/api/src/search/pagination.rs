use serde::Serialize;

use crate::models::job::JobPost;
use crate::search::filter::JobFilter;
use crate::search::store::{JobOrder, JobStore};
use crate::search::SearchError;

/// Pages past the last one that are still served (empty) rather than redirected.
const PAGE_SLACK: u32 = 2;

/// Links for a "two pages either side" pagination widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdjacentPages {
    pub prev_page: u32,
    pub previous_page: u32,
    pub next_page: u32,
    pub after_next_page: u32,
}

/// Returns `(prev, prev2, next, next2)` clamped to `1..=total_pages`.
/// With no results the single empty page 1 is the last page.
pub fn adjacent_pages(page: u32, total_pages: u32) -> (u32, u32, u32, u32) {
    let last = total_pages.max(1);
    let clamp = |p: u32| p.clamp(1, last);

    let (prev, prev2) = if page <= 2 {
        (1, 1)
    } else {
        (page - 1, page - 2)
    };

    let (next, next2) = if page >= last {
        (last, last)
    } else {
        (page + 1, page + 2)
    };

    (clamp(prev), clamp(prev2), clamp(next), clamp(next2))
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

/// Validates a raw 1-based page number. Missing means page 1.
///
/// Non-numeric, zero, negative, or more than two pages past the end yields
/// `InvalidPageNumber`, which callers turn into a redirect to page 1.
pub fn resolve_page(raw: Option<&str>, total_pages: u32) -> Result<u32, SearchError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(1);
    };
    let invalid = || SearchError::InvalidPageNumber {
        requested: raw.to_string(),
    };
    let page: i64 = raw.parse().map_err(|_| invalid())?;
    if page <= 0 || page > i64::from(total_pages) + i64::from(PAGE_SLACK) {
        return Err(invalid());
    }
    Ok(page as u32)
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub items: Vec<JobPost>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub adjacent: AdjacentPages,
    /// Nothing matched at all; callers show the 404-with-suggestions view.
    pub no_matches: bool,
}

/// Counts, validates the page, then fetches one slice with the same filter.
pub async fn execute_page(
    store: &dyn JobStore,
    filter: &JobFilter,
    order: JobOrder,
    page: Option<&str>,
    page_size: u32,
) -> Result<SearchPage, SearchError> {
    let page_size = page_size.max(1);
    let total_count = store.count(filter).await?;
    let total_pages = total_pages(total_count, page_size);
    let page = resolve_page(page, total_pages)?;

    let items = if total_count == 0 {
        Vec::new()
    } else {
        let offset = u64::from(page - 1) * u64::from(page_size);
        store.fetch(filter, order, offset, u64::from(page_size)).await?
    };

    let (prev_page, previous_page, next_page, after_next_page) = adjacent_pages(page, total_pages);
    Ok(SearchPage {
        items,
        total_count,
        page,
        page_size,
        total_pages,
        adjacent: AdjacentPages {
            prev_page,
            previous_page,
            next_page,
            after_next_page,
        },
        no_matches: total_count == 0,
    })
}
