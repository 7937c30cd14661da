pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::search::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job search
        .route("/api/v1/jobs/search", post(handlers::handle_explicit_search))
        .route("/api/v1/jobs/slug/:fragment", get(handlers::handle_slug_search))
        .route(
            "/api/v1/jobs/walkins/slug/:fragment",
            get(handlers::handle_walkin_slug_search),
        )
        // Vocabulary
        .route(
            "/api/v1/vocabulary/:kind/resolve",
            get(handlers::handle_resolve),
        )
        .route(
            "/api/v1/vocabulary/invalidate",
            post(handlers::handle_invalidate_vocabulary),
        )
        // Autocomplete
        .route("/api/v1/suggest/skills", get(handlers::handle_suggest_skills))
        .route(
            "/api/v1/suggest/locations",
            get(handlers::handle_suggest_locations),
        )
        .route(
            "/api/v1/suggest/industries",
            get(handlers::handle_suggest_industries),
        )
        .route(
            "/api/v1/suggest/functional_areas",
            get(handlers::handle_suggest_functional_areas),
        )
        .route(
            "/api/v1/suggest/qualifications",
            get(handlers::handle_suggest_qualifications),
        )
        .route("/api/v1/suggest/states", get(handlers::handle_suggest_states))
        .route("/api/v1/suggest/slug", get(handlers::handle_build_slug))
        .with_state(state)
}
