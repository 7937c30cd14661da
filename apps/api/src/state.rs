use std::sync::Arc;

use crate::config::Config;
use crate::search::snapshot::VocabularyService;
use crate::search::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Postgres in production; in-memory in tests.
    pub jobs: Arc<dyn JobStore>,
    /// Read-through vocabulary snapshot (Redis or in-process cache).
    pub vocabulary: Arc<VocabularyService>,
}
