//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Errors raised while building a [`Router`](crate::Router).
///
/// These are configuration mistakes; dispatch itself never fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A route with the same method and template is already registered.
    #[error("duplicate route: {method} {pattern}")]
    DuplicateRoute {
        /// HTTP method.
        method: Method,
        /// Path template.
        pattern: String,
    },

    /// The path template is malformed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Path template.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl RouterError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for route registration.
pub type RouterResult<T> = Result<T, RouterError>;
