//! Unified API error type and conversions.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::bytesize::format_bytes;
use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Upload body exceeded the configured ceiling; carries the limit
    /// in bytes so the response can report it in human units.
    PayloadTooLarge(u64),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::PayloadTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("file too large, maximum size is {}", format_bytes(limit)),
            )
                .into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::InvalidName => ApiError::BadRequest("invalid filename".into()),
            StorageError::NotFound => ApiError::NotFound("file not found".into()),
            StorageError::NotAFile => ApiError::BadRequest("not a file".into()),
            StorageError::PermissionDenied => ApiError::Internal("permission denied".into()),
            StorageError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}
