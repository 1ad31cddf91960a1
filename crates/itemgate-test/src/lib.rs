//! # Itemgate Test
//!
//! Drive a [`Router`](itemgate_router::Router) in-process.
//!
//! - [`TestClient`] - Request builder bound to a router
//! - [`TestResponse`] - Response with assertion helpers
//! - [`TestError`] - Request building and body decoding failures

#![doc(html_root_url = "https://docs.rs/itemgate-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
