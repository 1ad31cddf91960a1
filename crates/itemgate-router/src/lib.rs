//! # Itemgate Router
//!
//! Maps (method, path) to handlers and gates routes behind a bearer token.
//!
//! - [`Router`] - Route table, exact then parameterized matching, dispatch
//! - [`PathPattern`] / [`PatternCache`] - `{name}` templates compiled once
//! - [`AuthGate`] / [`TokenValidator`] - Bearer extraction and validation
//! - [`RouterError`] - Registration failures

#![doc(html_root_url = "https://docs.rs/itemgate-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
mod error;
pub mod handler;
mod pattern;
mod pattern_proptest;
mod router;

pub use auth::{AuthGate, StaticTokenValidator, TokenValidator, UnverifiedJwtValidator};
pub use error::{RouterError, RouterResult};
pub use handler::{ErasedHandler, HandlerFuture};
pub use pattern::{PathPattern, PatternCache};
pub use router::{RouteMatch, Router, ROUTE_NOT_FOUND_MESSAGE};
