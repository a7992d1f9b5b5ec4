//! Shared API state and error type
//!
//! Every handler returns `ApiError` on failure; service errors convert into
//! it so the status code mapping lives in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::db::DynDatabasePool;
use crate::services::{
    AuthorService, AuthorServiceError, BlogPostService, BlogPostServiceError, ValidationErrors,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub post_service: Arc<BlogPostService>,
    pub author_service: Arc<AuthorService>,
    pub pagination: Arc<PaginationConfig>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Validation failure listing each failing field in `details`
    pub fn invalid_fields(errors: &ValidationErrors) -> Self {
        let details = serde_json::to_value(errors).unwrap_or(serde_json::Value::Null);
        Self::with_details("VALIDATION_ERROR", "Invalid input", details)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Log a storage failure and hide its cause from the client
    pub fn storage(err: &anyhow::Error) -> Self {
        tracing::error!("Storage error: {:#}", err);
        Self::internal_error("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<BlogPostServiceError> for ApiError {
    fn from(err: BlogPostServiceError) -> Self {
        match err {
            BlogPostServiceError::NotFound(msg) => ApiError::not_found(msg),
            BlogPostServiceError::ValidationError(errors) => ApiError::invalid_fields(&errors),
            BlogPostServiceError::Storage(e) => ApiError::storage(&e),
        }
    }
}

impl From<AuthorServiceError> for ApiError {
    fn from(err: AuthorServiceError) -> Self {
        match err {
            AuthorServiceError::NotFound(msg) => ApiError::not_found(msg),
            AuthorServiceError::ValidationError(errors) => ApiError::invalid_fields(&errors),
            AuthorServiceError::Storage(e) => ApiError::storage(&e),
        }
    }
}
