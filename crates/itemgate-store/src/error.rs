//! Store error types.

use thiserror::Error;

/// Errors raised by an [`ItemStore`](crate::ItemStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Backend-provided detail.
        message: String,
    },

    /// The backend rejected or failed an operation.
    #[error("store operation '{operation}' failed: {message}")]
    OperationFailed {
        /// Operation name (`get`, `put`, `delete`, `scan`).
        operation: &'static str,
        /// Backend-provided detail.
        message: String,
    },

    /// A stored record could not be mapped back to an item.
    #[error("corrupt record {partition}: {message}")]
    CorruptRecord {
        /// Partition key of the offending record.
        partition: String,
        /// What was wrong with it.
        message: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an operation failure.
    pub fn operation_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation,
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
