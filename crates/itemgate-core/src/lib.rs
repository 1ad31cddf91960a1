//! # Itemgate Core
//!
//! Core types shared by every itemgate crate.
//!
//! - [`Item`], [`NewItem`], [`ItemUpdate`] - The item resource and its inputs
//! - [`ApiRequest`] / [`ApiResponse`] - Host-neutral request and response
//! - [`ApiError`] - The error taxonomy and its mapping to status codes
//! - [`Principal`] - Authenticated caller identity
//! - [`Clock`] - Injectable time source

#![doc(html_root_url = "https://docs.rs/itemgate-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod error;
pub mod fixtures;
mod identity;
mod model;
mod params;
mod request;
mod response;

pub use clock::{Clock, SystemClock};
pub use error::{
    ApiError, ApiResult, ErrorBody, ErrorCode, INTERNAL_ERROR_MESSAGE, UNAUTHORIZED_MESSAGE,
};
pub use identity::Principal;
pub use model::{non_blank, Item, ItemUpdate, NewItem};
pub use params::Params;
pub use request::{ApiRequest, INVALID_BODY_MESSAGE};
pub use response::{ApiResponse, JSON_CONTENT_TYPE, SERIALIZATION_FAILURE_BODY};
