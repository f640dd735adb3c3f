//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`.
//!
//! Clients get plain-text bodies and tell failures apart only by status code:
//!
//! | Error | Status |
//! |---|---|
//! | `BadRequest`, malformed body | 400 |
//! | `NotFound`, missing record | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `Database` | 500, with the underlying error text |

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use shop_catalog_core::NormalizeError;

use crate::db::RepositoryError;

/// Methods served on the shops collection, for the `Allow` header.
pub const SHOPS_ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE";

/// Application-level error type for the catalog server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error(transparent)]
    Database(RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP method not served on this path.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record does not exist".to_string()),
            other => Self::Database(other),
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Client error");
        }

        let message = self.to_string();

        if matches!(self, Self::MethodNotAllowed) {
            return (status, [(header::ALLOW, SHOPS_ALLOWED_METHODS)], message).into_response();
        }

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
