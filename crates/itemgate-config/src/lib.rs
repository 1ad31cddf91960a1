//! # Itemgate Config
//!
//! Layered configuration for the itemgate server.
//!
//! - [`ItemgateConfig`] - Top-level configuration
//! - [`ConfigLoader`] - Defaults, then a TOML/JSON file, then environment
//! - [`ConfigError`] - Load and validation failures
//!
//! ## Example
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! request_timeout_ms = 30000
//!
//! [auth]
//! validator = "unverified_jwt"
//! default_subject = "user-123"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```
//!
//! Any key can be overridden with `ITEMGATE__SECTION__KEY`, e.g.
//! `ITEMGATE__SERVER__HTTP_ADDR=127.0.0.1:3000`.

#![doc(html_root_url = "https://docs.rs/itemgate-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::ItemgateConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{AuthConfig, LoggingConfig, MetricsConfig, ServerConfig, ValidatorKind};
