//! Item CRUD logic over an [`ItemStore`].
//!
//! The service owns identifier and timestamp generation and validates
//! names. Every store call is a single operation: `update` reads before
//! it writes, so two concurrent updates of one item race and the last
//! write wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use itemgate_core::{non_blank, ApiError, ApiResult, Clock, Item, ItemUpdate, NewItem, SystemClock};
use itemgate_store::{ItemKey, ItemRecord, ItemStore, StoreError};
use tracing::{debug, info};
use uuid::Uuid;

/// Page size used when the caller gives none or an invalid one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Validation message for a missing or blank name.
pub const NAME_REQUIRED_MESSAGE: &str = "Name is required";

/// Validation message for a body id that differs from the path id.
pub const ID_MISMATCH_MESSAGE: &str = "Item ID in path must match ID in body";

/// Resolves a raw `limit` query value.
///
/// Accepts integers in `1..=100`; anything else, including absence,
/// yields [`DEFAULT_PAGE_LIMIT`].
///
/// ```rust
/// use itemgate_service::page_limit;
///
/// assert_eq!(page_limit(Some("50")), 50);
/// assert_eq!(page_limit(Some("0")), 20);
/// assert_eq!(page_limit(Some("500")), 20);
/// assert_eq!(page_limit(Some("abc")), 20);
/// assert_eq!(page_limit(None), 20);
/// ```
#[must_use]
pub fn page_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .map_or(DEFAULT_PAGE_LIMIT, clamp_limit)
}

fn clamp_limit(limit: usize) -> usize {
    if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        limit
    } else {
        DEFAULT_PAGE_LIMIT
    }
}

fn store_failure(operation: &str, error: StoreError) -> ApiError {
    ApiError::internal_with_source(format!("item store {operation} failed"), error)
}

/// Item CRUD operations.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    /// Creates a service over `store` using `clock` for timestamps.
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a service using the system clock.
    pub fn with_system_clock(store: Arc<dyn ItemStore>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    /// Current instant according to the service clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Lists up to `limit` items in store order.
    ///
    /// `limit` outside `1..=100` falls back to the default.
    pub async fn list(&self, limit: usize) -> ApiResult<Vec<Item>> {
        let limit = clamp_limit(limit);
        let records = self
            .store
            .scan(limit)
            .await
            .map_err(|e| store_failure("scan", e))?;

        let items = records
            .into_iter()
            .take(limit)
            .map(|r| r.into_item().map_err(|e| store_failure("scan", e)))
            .collect::<ApiResult<Vec<_>>>()?;
        debug!(limit, count = items.len(), "listed items");
        Ok(items)
    }

    /// Fetches an item.
    pub async fn get(&self, id: &str) -> ApiResult<Item> {
        let item = self
            .find(id)
            .await?
            .ok_or_else(|| ApiError::item_not_found(id))?;
        debug!(item_id = %id, "fetched item");
        Ok(item)
    }

    /// Creates an item with a fresh id and equal timestamps.
    pub async fn create(&self, input: NewItem) -> ApiResult<Item> {
        let name = required_name(input.name)?;
        let now = self.clock.now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };

        self.store
            .put(ItemRecord::from_item(&item))
            .await
            .map_err(|e| store_failure("put", e))?;
        info!(item_id = %item.id, "created item");
        Ok(item)
    }

    /// Replaces an existing item's name and description.
    ///
    /// A body id, when present and non-blank, must equal `id`. The stored
    /// `createdAt` is kept; `updatedAt` never moves backwards.
    pub async fn update(&self, id: &str, input: ItemUpdate) -> ApiResult<Item> {
        let name = required_name(input.name)?;
        if let Some(body_id) = non_blank(input.id.as_deref()) {
            if body_id != id {
                return Err(ApiError::validation(ID_MISMATCH_MESSAGE));
            }
        }

        let existing = self
            .find(id)
            .await?
            .ok_or_else(|| ApiError::item_not_found(id))?;

        let item = Item {
            id: existing.id,
            name,
            description: input.description,
            created_at: existing.created_at,
            updated_at: self.clock.now().max(existing.updated_at),
        };

        self.store
            .put(ItemRecord::from_item(&item))
            .await
            .map_err(|e| store_failure("put", e))?;
        info!(item_id = %item.id, "updated item");
        Ok(item)
    }

    /// Deletes an item. Deleting an absent id succeeds.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store
            .delete(&ItemKey::for_item(id))
            .await
            .map_err(|e| store_failure("delete", e))?;
        info!(item_id = %id, "deleted item");
        Ok(())
    }

    async fn find(&self, id: &str) -> ApiResult<Option<Item>> {
        self.store
            .get(&ItemKey::for_item(id))
            .await
            .map_err(|e| store_failure("get", e))?
            .map(|record| record.into_item().map_err(|e| store_failure("get", e)))
            .transpose()
    }
}

fn required_name(name: Option<String>) -> ApiResult<String> {
    match name {
        Some(name) if non_blank(Some(name.as_str())).is_some() => Ok(name),
        _ => Err(ApiError::validation(NAME_REQUIRED_MESSAGE)),
    }
}
