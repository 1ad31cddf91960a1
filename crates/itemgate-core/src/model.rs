//! Item data model.
//!
//! [`Item`] is the persisted resource. [`NewItem`] is the body of a create
//! call and [`ItemUpdate`] the body of an update call; both keep `name`
//! optional so a missing or `null` name reaches validation instead of
//! failing JSON parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored item.
///
/// `id` and `created_at` never change after creation; `updated_at` never
/// moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Opaque unique identifier.
    pub id: String,
    /// Display name, never blank.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last successful mutation instant.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    /// Required; validated by the service.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewItem {
    /// Creates a new item input with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for updating an item.
///
/// Client-supplied timestamps are accepted for shape compatibility with
/// [`Item`] but are not trusted: the service keeps the stored `createdAt`
/// and stamps `updatedAt` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    /// Must match the target id when present and non-blank.
    #[serde(default)]
    pub id: Option<String>,
    /// Required; validated by the service.
    #[serde(default)]
    pub name: Option<String>,
    /// Replaces the stored description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ignored.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Ignored.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ItemUpdate {
    /// Creates an update with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the body id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<Item> for ItemUpdate {
    fn from(item: Item) -> Self {
        Self {
            id: Some(item.id),
            name: Some(item.name),
            description: item.description,
            created_at: Some(item.created_at),
            updated_at: Some(item.updated_at),
        }
    }
}

/// Returns the trimmed name if it is present and not blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
