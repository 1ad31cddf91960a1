//! # Itemgate Server
//!
//! Hosting adapters for the itemgate API.
//!
//! - [`HttpHost`] - HTTP/1 server on hyper and tokio
//! - [`EventHost`] - Handles API-Gateway-style proxy events
//! - [`build_app`] - Wires configuration, store and clock into a router
//! - [`ShutdownSignal`] - Cooperative shutdown for the HTTP host

#![doc(html_root_url = "https://docs.rs/itemgate-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
pub mod event;
pub mod host;
pub mod shutdown;

pub use app::{build_app, build_default_app, build_gate};
pub use error::{ServerError, ServerResult};
pub use event::{EventHost, ProxyEvent, ProxyResponse};
pub use host::HttpHost;
pub use shutdown::{ConnectionTracker, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
