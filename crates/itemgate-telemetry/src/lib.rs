//! Logging and metrics for itemgate.
//!
//! - [`logging`] - `tracing-subscriber` installation, JSON or pretty
//! - [`metrics`] - Request counters and latency histograms exported to
//!   Prometheus

#![doc(html_root_url = "https://docs.rs/itemgate-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use crate::logging::{init_logging, LogConfig, LogFormat};
pub use crate::metrics::{init_metrics, record_request, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
