use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CandidateResult<T> = Result<T, CandidateError>;

impl CandidateError {
    /// Short label used for the error-kind metric.
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateError::Validation(_) => "validation",
            CandidateError::CollectionNotFound(_) => "not_found",
            CandidateError::Store(_) => "store",
            CandidateError::Embedding(_) => "embedding",
            CandidateError::Config(_) => "config",
            CandidateError::Internal(_) => "internal",
        }
    }
}

impl From<qdrant_client::QdrantError> for CandidateError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        CandidateError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for CandidateError {
    fn from(err: reqwest::Error) -> Self {
        CandidateError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for CandidateError {
    fn from(err: serde_json::Error) -> Self {
        CandidateError::Internal(format!("JSON error: {}", err))
    }
}

impl From<core_config::ConfigError> for CandidateError {
    fn from(err: core_config::ConfigError) -> Self {
        CandidateError::Config(err.to_string())
    }
}

/// Convert CandidateError to AppError for standardized HTTP error responses
impl From<CandidateError> for AppError {
    fn from(err: CandidateError) -> Self {
        match err {
            CandidateError::Validation(msg) => AppError::BadRequest(msg),
            CandidateError::CollectionNotFound(name) => {
                AppError::NotFound(format!("Collection {} not found", name))
            }
            CandidateError::Store(msg) => AppError::Upstream(format!("Vector store error: {}", msg)),
            CandidateError::Embedding(msg) => {
                AppError::Upstream(format!("Embedding error: {}", msg))
            }
            CandidateError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            CandidateError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CandidateError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status(err: CandidateError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status(CandidateError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(CandidateError::CollectionNotFound("candidats".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(CandidateError::Store("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(CandidateError::Embedding("503".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(CandidateError::Config("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
