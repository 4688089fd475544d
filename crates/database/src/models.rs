use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `items` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user-editable fields of an item, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChanges {
    pub name: String,
    pub description: String,
}

impl ItemChanges {
    /// Trims `name` and maps a missing description to an empty string.
    ///
    /// Returns `None` when no usable name remains.
    pub fn normalize(name: Option<&str>, description: Option<String>) -> Option<Self> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;
        Some(Self {
            name: name.to_string(),
            description: description.unwrap_or_default(),
        })
    }
}
