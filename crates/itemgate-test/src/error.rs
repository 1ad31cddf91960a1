//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading a response.
#[derive(Debug, Error)]
pub enum TestError {
    /// A header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The query string could not be decoded.
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The response had no body.
    #[error("Response has no body")]
    EmptyBody,

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
