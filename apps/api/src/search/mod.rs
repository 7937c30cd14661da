// Faceted job search: vocabulary resolution, filter building, paging.
// The resolver, filter builder and paginator are pure; storage and caching
// sit behind the `JobStore`, `VocabularySource` and `SnapshotCache` traits.

pub mod cache;
pub mod engine;
pub mod filter;
pub mod handlers;
pub mod pagination;
pub mod request;
pub mod snapshot;
pub mod store;
pub mod suggest;
pub mod vocabulary;

#[cfg(test)]
pub mod fixtures;

use thiserror::Error;

use crate::search::vocabulary::EntityKind;

/// Conditions the search layer hands back to its callers. None of them is
/// retried or logged here.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Non-numeric, non-positive, or far out of range page request.
    #[error("Invalid page number: {requested}")]
    InvalidPageNumber { requested: String },

    /// Nothing in the active vocabulary matched the fragment.
    #[error("No active {} matches '{fragment}'", kind.as_str())]
    NoVocabularyMatch { fragment: String, kind: EntityKind },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(String),
}
