//! Host error types.

use thiserror::Error;

/// Errors raised by the hosting adapters.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Routes could not be registered.
    #[error("router setup failed: {0}")]
    Router(#[from] itemgate_router::RouterError),

    /// Event JSON could not be parsed or produced.
    #[error("event JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for host operations.
pub type ServerResult<T> = Result<T, ServerError>;
