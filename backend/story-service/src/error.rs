/// Error types for Story Service
///
/// Every failure that reaches the HTTP layer is rendered as an error view
/// (`error/<status>`), mirroring how the handlers render successful views.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::handlers::views::View;

/// Result type for story-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Story store operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Payload failed schema validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error originated in the story store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::DatabaseError(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Store details stay in the logs.
        let message = match self {
            AppError::DatabaseError(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        };
        View::error(status, &message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
