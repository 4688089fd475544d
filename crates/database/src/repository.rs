use crate::models::{Item, ItemChanges};
use crate::DbError;
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;

/// The query set the API layer runs against the `items` table.
///
/// Implementations must return `list_all` newest first and must never store a
/// null description.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items ordered by `created_at`, most recent first.
    async fn list_all(&self) -> Result<Vec<Item>, DbError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Item>, DbError>;

    /// Inserts a row and returns it as stored, including the assigned id and timestamps.
    async fn insert(&self, changes: &ItemChanges) -> Result<Item, DbError>;

    /// Rewrites name and description and bumps `updated_at`.
    ///
    /// Returns `None` if no row with `id` exists by the time it is re-read.
    async fn update(&self, id: i32, changes: &ItemChanges) -> Result<Option<Item>, DbError>;

    /// Removes the row, returning how many rows were deleted.
    async fn delete(&self, id: i32) -> Result<u64, DbError>;
}

const SELECT_ITEM_COLUMNS: &str =
    "SELECT id, name, COALESCE(description, '') AS description, created_at, updated_at FROM items";

/// Narrows MySQL's `last_insert_id` to the `INT` id column.
fn item_id(raw: u64) -> Result<i32, DbError> {
    i32::try_from(raw).map_err(|_| DbError::IdOutOfRange(raw))
}

/// The `MySqlItemRepository` encapsulates all SQL issued on behalf of the API.
#[derive(Debug, Clone)]
pub struct MySqlItemRepository {
    pool: MySqlPool,
}

impl MySqlItemRepository {
    /// Creates a new repository over the pool returned by `provision`.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for MySqlItemRepository {
    async fn list_all(&self) -> Result<Vec<Item>, DbError> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "{SELECT_ITEM_COLUMNS} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Item>, DbError> {
        let item = sqlx::query_as::<_, Item>(&format!("{SELECT_ITEM_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn insert(&self, changes: &ItemChanges) -> Result<Item, DbError> {
        let result = sqlx::query("INSERT INTO items (name, description) VALUES (?, ?)")
            .bind(&changes.name)
            .bind(&changes.description)
            .execute(&self.pool)
            .await?;

        // Read the row back so the response carries the server-computed columns.
        let id = item_id(result.last_insert_id())?;
        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn update(&self, id: i32, changes: &ItemChanges) -> Result<Option<Item>, DbError> {
        // `ON UPDATE` does not fire when the new values equal the old ones.
        sqlx::query(
            "UPDATE items SET name = ?, description = ?, updated_at = CURRENT_TIMESTAMP(6) WHERE id = ?",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
