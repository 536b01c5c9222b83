//! Error types for the cache node
//!
//! Provides unified error handling using thiserror. A missing key is not an
//! error: lookups report absence through `success = false`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache node.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty or malformed request data
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Store is not accepting writes (shutting down)
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// A peer could not be reached or timed out during fan-out
    #[error("Replication to {peer} failed: {reason}")]
    Replication { peer: String, reason: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Replication { .. } | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "success": false
        }));

        (status, body).into_response()
    }
}

// == Extractor Rejections ==
/// A body that is not valid JSON, or lacks a well-typed `key`, is a bad
/// argument like any other.
impl From<JsonRejection> for CacheError {
    fn from(rejection: JsonRejection) -> Self {
        CacheError::InvalidArgument(rejection.body_text())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
