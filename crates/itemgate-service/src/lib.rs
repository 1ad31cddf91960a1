//! # Itemgate Service
//!
//! The item API: CRUD logic, one handler per route, and the router that
//! ties them together.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use itemgate_router::AuthGate;
//! use itemgate_service::{build_router, ItemService};
//! use itemgate_store::MemoryItemStore;
//!
//! let service = Arc::new(ItemService::with_system_clock(MemoryItemStore::new_shared()));
//! let router = build_router(service, AuthGate::default())?;
//! let response = router.dispatch(request).await;
//! ```

#![doc(html_root_url = "https://docs.rs/itemgate-service/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod handlers;
mod routes;
mod service;

pub use routes::{build_router, ITEMS_PATH, ITEM_PATH, PROTECTED_PATH, PUBLIC_PATH};
pub use service::{
    page_limit, ItemService, DEFAULT_PAGE_LIMIT, ID_MISMATCH_MESSAGE, MAX_PAGE_LIMIT,
    NAME_REQUIRED_MESSAGE,
};
