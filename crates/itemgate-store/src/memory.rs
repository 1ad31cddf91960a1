//! In-memory item store.
//!
//! Records live in a `BTreeMap` behind a `parking_lot::RwLock`, so `scan`
//! returns records in key order. The lock is never held across an await.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use crate::error::StoreResult;
use crate::traits::{ItemKey, ItemRecord, ItemStore};

/// In-memory implementation of [`ItemStore`].
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    records: RwLock<BTreeMap<ItemKey, ItemRecord>>,
}

impl MemoryItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped in `Arc`.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<ItemRecord>> {
        Ok(self.records.read().get(key).cloned())
    }

    #[instrument(skip(self, record), fields(key = %record.key))]
    async fn put(&self, record: ItemRecord) -> StoreResult<()> {
        self.records.write().insert(record.key.clone(), record);
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &ItemKey) -> StoreResult<()> {
        self.records.write().remove(key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn scan(&self, limit: usize) -> StoreResult<Vec<ItemRecord>> {
        Ok(self.records.read().values().take(limit).cloned().collect())
    }
}
