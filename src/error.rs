use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Disabled(String),

    #[error("No player identity on request")]
    Unauthenticated,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("Corrupt stored value: {0}")]
    CorruptRecord(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;

impl ScoringError {
    /// Stable kind label used in batch item reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Disabled(_) => "disabled",
            Self::Unauthenticated => "unauthenticated",
            Self::Database(_) | Self::Timestamp(_) | Self::CorruptRecord(_) => "internal",
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            ScoringError::Database(sqlx::Error::Database(e)) if e.is_unique_violation()
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Disabled(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Timestamp(_) | Self::CorruptRecord(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ScoringError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Database(_) | Self::Timestamp(_) | Self::CorruptRecord(_) => {
                tracing::error!("Internal error: {:?}", self);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
