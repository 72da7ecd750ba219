//! Error types for the storefront guard
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Remote Error Enum ==
/// Failure classifications reported by a remote data capability.
///
/// Never cached; always handed back to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote entity does not exist
    #[error("Remote entity not found: {0}")]
    NotFound(String),

    /// The remote call did not complete within its budget
    #[error("Remote call timed out: {0}")]
    Timeout(String),
}

// == Service Error Enum ==
/// Unified error type for the guard layer and the HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Bad constructor or startup arguments
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Entity absent, either remotely or in the session payload
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote call exceeded its budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The availability gate reports this node as down
    #[error("Service unavailable")]
    Unavailable,

    /// Session payload tag does not match its contents
    #[error("Session tag mismatch")]
    TagMismatch,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RemoteError> for ServiceError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(what) => ServiceError::NotFound(what),
            RemoteError::Timeout(what) => ServiceError::Timeout(what),
        }
    }
}

impl ServiceError {
    /// HTTP status equivalent of this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidConfiguration(_) | ServiceError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ServiceError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::TagMismatch => StatusCode::FORBIDDEN,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the guard layer.
pub type Result<T> = std::result::Result<T, ServiceError>;
