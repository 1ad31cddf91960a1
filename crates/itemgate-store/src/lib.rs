//! # Itemgate Store
//!
//! Persistence boundary for items.
//!
//! - [`ItemStore`] - Async key-value store trait (get/put/delete/scan)
//! - [`ItemKey`] / [`ItemRecord`] - Composite key and persisted shape
//! - [`MemoryItemStore`] - In-process backend
//! - [`StoreError`] - Backend failures

#![doc(html_root_url = "https://docs.rs/itemgate-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryItemStore;
pub use traits::{ItemKey, ItemRecord, ItemStore, ITEM_PARTITION_PREFIX, METADATA_SORT_KEY};
