use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::job::JobType;
use crate::search::engine::{
    default_order, search_by_ambiguous_fragment, search_by_explicit_facets, AmbiguousQuery,
    SearchOptions, SearchOutcome,
};
use crate::search::request::SearchRequest;
use crate::search::suggest::{
    build_search_slugs, suggest_entries, suggest_locations, suggest_skills, SearchSlugs, Suggestion,
};
use crate::search::vocabulary::{resolve_vocabulary, EntityKind};
use crate::state::AppState;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Deserialize)]
pub struct SlugSearchQuery {
    pub page: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
}

fn parse_job_type(raw: Option<&str>) -> Result<Option<JobType>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => JobType::parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown job type '{raw}'"))),
    }
}

fn parse_experience(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Experience must be a whole number of years, got '{raw}'"))),
    }
}

async fn slug_search(
    state: &AppState,
    query: AmbiguousQuery,
    page: Option<String>,
    page_size: u32,
    first_page: &str,
) -> Result<Json<SearchOutcome>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let options = SearchOptions {
        page,
        page_size,
        order: default_order(query.job_type),
        today: today(),
    };

    let outcome = search_by_ambiguous_fragment(state.jobs.as_ref(), &snapshot, &query, &options)
        .await
        .map_err(|e| AppError::from_search(e, first_page))?;

    info!(
        "Slug search '{}' page {}: {} jobs",
        query.fragment, outcome.page.page, outcome.page.total_count
    );
    Ok(Json(outcome))
}

/// GET /api/v1/jobs/slug/:fragment
pub async fn handle_slug_search(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
    Query(params): Query<SlugSearchQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<SearchOutcome>, AppError> {
    let query = AmbiguousQuery {
        job_type: parse_job_type(params.job_type.as_deref())?,
        experience: parse_experience(params.experience.as_deref())?,
        fragment,
    };
    let page_size = if query.job_type == Some(JobType::WalkIn) {
        state.config.page_sizes.walkins
    } else {
        state.config.page_sizes.jobs
    };
    // The raw request path is still percent-encoded, so it is a valid Location.
    slug_search(&state, query, params.page, page_size, uri.path()).await
}

/// GET /api/v1/jobs/walkins/slug/:fragment
pub async fn handle_walkin_slug_search(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
    Query(params): Query<SlugSearchQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<SearchOutcome>, AppError> {
    let query = AmbiguousQuery {
        job_type: Some(JobType::WalkIn),
        experience: parse_experience(params.experience.as_deref())?,
        fragment,
    };
    let page_size = state.config.page_sizes.walkins;
    slug_search(&state, query, params.page, page_size, uri.path()).await
}

/// POST /api/v1/jobs/search
///
/// An invalid `?page=` is a 400 here; a POST body cannot follow a redirect.
pub async fn handle_explicit_search(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let page_size = if request.wants_walkins() {
        state.config.page_sizes.walkins
    } else {
        state.config.page_sizes.jobs
    };
    let options = SearchOptions {
        page: params.page,
        page_size,
        order: default_order(request.job_type),
        today: today(),
    };

    let outcome = search_by_explicit_facets(state.jobs.as_ref(), &snapshot, &request, &options).await?;
    info!(
        "Refine search page {}: {} jobs",
        outcome.page.page, outcome.page.total_count
    );
    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub fragment: String,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub kind: EntityKind,
    pub fragment: String,
    pub names: Vec<String>,
}

/// GET /api/v1/vocabulary/:kind/resolve
pub async fn handle_resolve(
    State(state): State<AppState>,
    Path(kind): Path<EntityKind>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let names = match kind {
        EntityKind::City => resolve_vocabulary(&params.fragment, &snapshot.cities),
        _ => resolve_vocabulary(&params.fragment, snapshot.entries(kind)),
    };
    debug!("Resolved {} '{}' to {:?}", kind.as_str(), params.fragment, names);
    Ok(Json(ResolveResponse {
        kind,
        fragment: params.fragment,
        names,
    }))
}

/// POST /api/v1/vocabulary/invalidate
pub async fn handle_invalidate_vocabulary(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.vocabulary.invalidate().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    /// Comma-separated names already selected.
    #[serde(default)]
    pub exclude: String,
    /// `search=filter` asks for the primary kind only (skills without
    /// qualifications, cities without states).
    #[serde(default)]
    pub search: Option<String>,
}

impl SuggestQuery {
    fn include_related(&self) -> bool {
        self.search.as_deref() != Some("filter")
    }

    fn excluded(&self) -> Vec<String> {
        self.exclude
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub results: Vec<Suggestion>,
}

/// GET /api/v1/suggest/skills
pub async fn handle_suggest_skills(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let results = suggest_skills(
        &snapshot,
        &params.q,
        &params.excluded(),
        params.include_related(),
        state.config.page_sizes.suggestions,
    );
    Ok(Json(SuggestResponse { results }))
}

/// GET /api/v1/suggest/locations
pub async fn handle_suggest_locations(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let results = suggest_locations(
        &snapshot,
        &params.q,
        &params.excluded(),
        params.include_related(),
        state.config.page_sizes.suggestions,
    );
    Ok(Json(SuggestResponse { results }))
}

async fn suggest_kind(
    state: &AppState,
    kind: EntityKind,
    params: &SuggestQuery,
) -> Result<Json<SuggestResponse>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    let results = suggest_entries(
        &snapshot,
        kind,
        &params.q,
        &params.excluded(),
        state.config.page_sizes.suggestions,
    );
    debug!("Suggest {} '{}': {} results", kind.as_str(), params.q, results.len());
    Ok(Json(SuggestResponse { results }))
}

/// GET /api/v1/suggest/industries
pub async fn handle_suggest_industries(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    suggest_kind(&state, EntityKind::Industry, &params).await
}

/// GET /api/v1/suggest/functional_areas
pub async fn handle_suggest_functional_areas(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    suggest_kind(&state, EntityKind::FunctionalArea, &params).await
}

/// GET /api/v1/suggest/qualifications
pub async fn handle_suggest_qualifications(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    suggest_kind(&state, EntityKind::Qualification, &params).await
}

/// GET /api/v1/suggest/states
pub async fn handle_suggest_states(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    suggest_kind(&state, EntityKind::State, &params).await
}

#[derive(Deserialize)]
pub struct SlugBuildQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub location: String,
}

/// GET /api/v1/suggest/slug
pub async fn handle_build_slug(
    State(state): State<AppState>,
    Query(params): Query<SlugBuildQuery>,
) -> Result<Json<SearchSlugs>, AppError> {
    let snapshot = state.vocabulary.snapshot().await?;
    Ok(Json(build_search_slugs(&snapshot, &params.q, &params.location)))
}
