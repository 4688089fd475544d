use crate::models::{Item, ItemChanges};
use crate::repository::ItemStore;
use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i32, Item>,
    next_id: i32,
    last_stamp: Option<DateTime<Utc>>,
}

impl Table {
    /// Wall-clock time, nudged forward so consecutive writes never share a timestamp.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// An `ItemStore` kept in process memory, for tests and local experiments.
///
/// Mirrors the MySQL table: ids start at 1 and are never reused, and
/// `updated_at` advances on every update.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_all(&self) -> Result<Vec<Item>, DbError> {
        let guard = self.table.read().await;
        let mut items: Vec<Item> = guard.rows.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Item>, DbError> {
        let guard = self.table.read().await;
        Ok(guard.rows.get(&id).cloned())
    }

    async fn insert(&self, changes: &ItemChanges) -> Result<Item, DbError> {
        let mut guard = self.table.write().await;
        guard.next_id += 1;
        let id = guard.next_id;
        let now = guard.stamp();
        let item = Item {
            id,
            name: changes.name.clone(),
            description: changes.description.clone(),
            created_at: now,
            updated_at: now,
        };
        guard.rows.insert(id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: i32, changes: &ItemChanges) -> Result<Option<Item>, DbError> {
        let mut guard = self.table.write().await;
        if !guard.rows.contains_key(&id) {
            return Ok(None);
        }
        let now = guard.stamp();
        let item = guard.rows.get_mut(&id).ok_or(DbError::NotFound)?;
        item.name = changes.name.clone();
        item.description = changes.description.clone();
        item.updated_at = now;
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: i32) -> Result<u64, DbError> {
        let mut guard = self.table.write().await;
        Ok(u64::from(guard.rows.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(name: &str) -> ItemChanges {
        ItemChanges {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = InMemoryItemStore::new();
        store.insert(&changes("first")).await.unwrap();
        store.insert(&changes("second")).await.unwrap();
        store.insert(&changes("third")).await.unwrap();

        let names: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryItemStore::new();
        let a = store.insert(&changes("a")).await.unwrap();
        assert_eq!(store.delete(a.id).await.unwrap(), 1);
        let b = store.insert(&changes("b")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.delete(a.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_advances_updated_at_only() {
        let store = InMemoryItemStore::new();
        let created = store.insert(&changes("a")).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let updated = store.update(created.id, &changes("a")).await.unwrap().unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = InMemoryItemStore::new();
        assert!(store.update(42, &changes("x")).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
