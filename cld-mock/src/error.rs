//! Error types for cld-mock
//!
//! Every error leaves the server as `{"detail": "..."}`, the body shape the
//! client reads its messages from.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cld_common::ErrorDetail;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Request body failed validation (422)
    #[error("{0}")]
    Unprocessable(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// cld-common error
    #[error("{0}")]
    Common(#[from] cld_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) | ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ErrorDetail::new(self.to_string()))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
