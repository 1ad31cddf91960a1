//! Error types for itemgate.
//!
//! This module provides the [`ApiError`] type, the single error taxonomy that
//! every handler and service operation returns. Each variant maps to exactly
//! one HTTP status and one machine-readable [`ErrorCode`]:
//!
//! | Variant | `ErrorCode` | Status |
//! |---|---|---|
//! | `Validation` | `BAD_REQUEST` | 400 |
//! | `Unauthorized` | `UNAUTHORIZED` | 401 |
//! | `NotFound` | `NOT_FOUND` | 404 |
//! | `Internal` | `INTERNAL_SERVER_ERROR` | 500 |
//!
//! Internal errors keep their message and source for logging, but the body
//! sent to clients always carries [`INTERNAL_ERROR_MESSAGE`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned to clients for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Message used when the caller presents no usable credentials.
pub const UNAUTHORIZED_MESSAGE: &str = "Missing or invalid authentication token";

/// Machine-readable error codes carried in [`ErrorBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller input is malformed or missing a required field.
    BadRequest,
    /// Missing, malformed or rejected bearer token on a gated route.
    Unauthorized,
    /// No route matched, or the referenced item does not exist.
    NotFound,
    /// Unexpected failure in routing, serialization or the store.
    InternalServerError,
}

impl ErrorCode {
    /// Returns the HTTP status code for this error code.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the wire representation (e.g. `"NOT_FOUND"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard error type for itemgate.
///
/// # Example
///
/// ```
/// use itemgate_core::{ApiError, ErrorCode};
///
/// fn require_name(name: Option<&str>) -> Result<&str, ApiError> {
///     match name.map(str::trim) {
///         Some(n) if !n.is_empty() => Ok(n),
///         _ => Err(ApiError::validation("Name is required")),
///     }
/// }
///
/// let err = require_name(Some("   ")).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::BadRequest);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Caller input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The request reached a gated route without an acceptable credential.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// The route or the referenced resource does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
        /// The identifier of the missing resource, if any.
        resource_id: Option<String>,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Message for logs only; never sent to clients.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApiError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error with the standard message.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            message: UNAUTHORIZED_MESSAGE.to_string(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_id: None,
        }
    }

    /// Creates a not found error for a specific item.
    #[must_use]
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            message: "Item not found".to_string(),
            resource_id: Some(id.into()),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::BadRequest,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Internal { .. } => ErrorCode::InternalServerError,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    /// Returns `true` for failures that must be logged as errors.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Builds the client-facing error body.
    ///
    /// Internal errors are reduced to [`INTERNAL_ERROR_MESSAGE`].
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            Self::Validation { message }
            | Self::Unauthorized { message }
            | Self::NotFound { message, .. } => message.clone(),
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        };
        ErrorBody {
            code: self.code(),
            message,
        }
    }
}

/// Serializable error body for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    /// Creates a new error body.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
