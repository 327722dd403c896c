use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::routes::alert;

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation { key: &'static str, message: String },

    #[error("Invalid search query: {0}")]
    Query(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Search index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure with a machine-readable error key
    pub fn validation(key: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            key,
            message: message.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Query(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::NotFound(_) => "NotFound",
            AppError::Validation { .. } => "ValidationError",
            AppError::Query(_) => "QueryError",
            AppError::Database(_) => "StorageError",
            AppError::Index(_) => "IndexError",
            AppError::Internal(_) => "InternalError",
        };

        let response = ErrorResponse {
            error: ErrorDetail {
                error_type: error_type.to_string(),
                message: self.to_string(),
            },
        };

        let mut builder = HttpResponse::build(self.status_code());

        // Validation failures carry the error key and entity name for the
        // client-side notification UI.
        if let AppError::Validation { key, .. } = self {
            builder.insert_header((alert::ERROR_HEADER, format!("error.{}", key)));
            builder.insert_header((alert::PARAMS_HEADER, "issue"));
        }

        builder.json(response)
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
