//! Error taxonomy shared by the library operations.
//!
//! Batch ingestion absorbs per-item failures into its report; everything
//! that targets a single file, record, or upstream call fails fast with
//! one of these variants. The HTTP layer maps each variant to a status
//! code through [`StartupError::status`].

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Missing file, missing record id, or no source files matched.
    #[error("{0}")]
    NotFound(String),

    /// Input that could not be turned into startup records.
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// The completion service failed or returned something unusable.
    #[error("completion service error: {0}")]
    Upstream(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StartupError>;

impl StartupError {
    pub fn status(&self) -> StatusCode {
        match self {
            StartupError::NotFound(_) => StatusCode::NOT_FOUND,
            StartupError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StartupError::NotFound(_) => "not_found",
            StartupError::Validation(_) => "bad_request",
            StartupError::Persistence(_) => "persistence",
            StartupError::Upstream(_) => "upstream",
            StartupError::Io(_) | StartupError::Json(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StartupError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StartupError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StartupError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(StartupError::Upstream("x".into()).code(), "upstream");
    }
}
