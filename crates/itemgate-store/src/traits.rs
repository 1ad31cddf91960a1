//! Store trait and the persisted record shape.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itemgate_core::Item;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Partition key prefix for item records.
pub const ITEM_PARTITION_PREFIX: &str = "ITEM#";

/// Sort key of the item metadata record.
pub const METADATA_SORT_KEY: &str = "METADATA";

/// Composite key addressing one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    /// Partition key, `ITEM#<id>`.
    pub partition: String,
    /// Sort key, always `METADATA` for items.
    pub sort: String,
}

impl ItemKey {
    /// Returns the key of the item with the given id.
    #[must_use]
    pub fn for_item(id: &str) -> Self {
        Self {
            partition: format!("{ITEM_PARTITION_PREFIX}{id}"),
            sort: METADATA_SORT_KEY.to_string(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition, self.sort)
    }
}

/// An item as the store holds it.
///
/// Timestamps are kept as RFC 3339 strings, the way a document store
/// would hold them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Composite key.
    pub key: ItemKey,
    /// Item id.
    pub id: String,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: Option<String>,
    /// Creation instant, RFC 3339.
    pub created_at: String,
    /// Last update instant, RFC 3339.
    pub updated_at: String,
}

impl ItemRecord {
    /// Builds the record for an item.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            key: ItemKey::for_item(&item.id),
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }

    /// Maps the record back to an item.
    ///
    /// Fails with [`StoreError::CorruptRecord`] when a timestamp does not
    /// parse.
    pub fn into_item(self) -> StoreResult<Item> {
        let created_at = parse_timestamp(&self.key, "created_at", &self.created_at)?;
        let updated_at = parse_timestamp(&self.key, "updated_at", &self.updated_at)?;
        Ok(Item {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(key: &ItemKey, field: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRecord {
            partition: key.partition.clone(),
            message: format!("invalid {field} '{raw}': {e}"),
        })
}

/// Key-value persistence for items.
///
/// Implementations must be safe to share across concurrent requests.
/// No operation is transactional; `put` is an unconditional upsert.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Reads a record.
    async fn get(&self, key: &ItemKey) -> StoreResult<Option<ItemRecord>>;

    /// Writes a record, replacing any existing one with the same key.
    async fn put(&self, record: ItemRecord) -> StoreResult<()>;

    /// Removes a record. Removing an absent key succeeds.
    async fn delete(&self, key: &ItemKey) -> StoreResult<()>;

    /// Returns up to `limit` records in store-defined order.
    async fn scan(&self, limit: usize) -> StoreResult<Vec<ItemRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemgate_core::fixtures::sample_item;

    fn item() -> Item {
        sample_item("abc", "Widget")
    }

    #[test]
    fn test_item_key_layout() {
        let key = ItemKey::for_item("abc");
        assert_eq!(key.partition, "ITEM#abc");
        assert_eq!(key.sort, "METADATA");
        assert_eq!(key.to_string(), "ITEM#abc/METADATA");
    }

    #[test]
    fn test_record_maps_back_to_item() {
        let record = ItemRecord::from_item(&item());
        assert_eq!(record.created_at, "2024-01-01T00:00:00+00:00");
        assert_eq!(record.into_item().unwrap(), item());
    }

    #[test]
    fn test_record_with_offset_timestamp() {
        let mut record = ItemRecord::from_item(&item());
        record.updated_at = "2024-01-01T02:00:00+02:00".to_string();
        let restored = record.into_item().unwrap();
        assert_eq!(restored.updated_at, restored.created_at);
    }

    #[test]
    fn test_corrupt_timestamp() {
        let mut record = ItemRecord::from_item(&item());
        record.created_at = "yesterday".to_string();
        let err = record.into_item().unwrap_err();
        assert!(matches!(err, StoreError::CorruptRecord { ref partition, .. } if partition == "ITEM#abc"));
        assert!(err.to_string().contains("created_at"));
    }
}
