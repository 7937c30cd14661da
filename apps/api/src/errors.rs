use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::search::vocabulary::EntityKind;
use crate::search::SearchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// A slug fragment that names nothing in the active vocabulary.
    #[error("No match for '{fragment}'")]
    NoMatch { fragment: String, kind: EntityKind },

    /// 303 to the canonical URL, used for out-of-range page numbers.
    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl AppError {
    /// Like `From<SearchError>`, but an invalid page redirects to `first_page`.
    pub fn from_search(err: SearchError, first_page: &str) -> Self {
        match err {
            SearchError::InvalidPageNumber { .. } => AppError::Redirect(first_page.to_string()),
            other => other.into(),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidPageNumber { requested } => {
                AppError::Validation(format!("Invalid page number: {requested}"))
            }
            SearchError::NoVocabularyMatch { fragment, kind } => AppError::NoMatch { fragment, kind },
            SearchError::StoreUnavailable(e) => AppError::Database(e),
            SearchError::Cache(msg) => AppError::Cache(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoMatch { fragment, kind } => {
                let body = Json(json!({
                    "error": {
                        "code": "NO_MATCH",
                        "message": format!("No jobs found for '{fragment}'"),
                        "searched": fragment,
                        "kind": kind,
                    }
                }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::Redirect(location) => match HeaderValue::from_str(location) {
                Ok(value) => {
                    return (StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response();
                }
                Err(_) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Invalid page number".to_string(),
                ),
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Cache(msg) => {
                tracing::error!("Cache error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "A cache error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_page_redirects_to_first_page() {
        let err = AppError::from_search(
            SearchError::InvalidPageNumber {
                requested: "999".into(),
            },
            "/api/v1/jobs/slug/java-jobs",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/jobs/slug/java-jobs"
        );
    }

    #[test]
    fn test_unencodable_redirect_target_is_400() {
        let response = AppError::Redirect("/api/v1/jobs/slug/java\njobs".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_no_vocabulary_match_is_404() {
        let err: AppError = SearchError::NoVocabularyMatch {
            fragment: "cobol".into(),
            kind: EntityKind::Skill,
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cache_error_is_500() {
        let err: AppError = SearchError::Cache("connection refused".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
