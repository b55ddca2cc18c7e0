//! Device key-value storage.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::sync::Mutex;
use tracing::debug;

use crate::Result;

/// String key-value store backing the persisted session.
///
/// Batch operations mirror the device storage the session was designed
/// against: writes and removals of several keys happen together.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write every `(key, value)` pair.
    async fn multi_set(&self, entries: &[(&str, String)]) -> Result<()>;

    /// Read the given keys, returning `None` for each missing key.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>>;

    /// Remove the given keys. Missing keys are ignored.
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

/// `SQLite`-backed key-value store.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS key_values (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn multi_set(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(
                r"
                INSERT INTO key_values (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP
                ",
            )
            .bind(*key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Stored {} keys", entries.len());
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            let row = sqlx::query("SELECT value FROM key_values WHERE key = ?")
                .bind(*key)
                .fetch_optional(&self.pool)
                .await?;
            values.push(row.map(|r| r.get::<String, _>("value")));
        }
        Ok(values)
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM key_values WHERE key = ?")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!("Removed {} keys", keys.len());
        Ok(())
    }
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn multi_set(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.lock().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let map = self.entries.lock().await;
        Ok(keys.iter().map(|k| map.get(*k).cloned()).collect())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sqlite_set_and_get() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store
            .multi_set(&[("a", "1".to_string()), ("b", "2".to_string())])
            .await
            .unwrap();

        let values = store.multi_get(&["a", "b", "missing"]).await.unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), Some("2".to_string()), None]
        );
    }

    #[tokio::test]
    async fn sqlite_overwrites_existing_key() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store.multi_set(&[("a", "1".to_string())]).await.unwrap();
        store.multi_set(&[("a", "2".to_string())]).await.unwrap();

        let values = store.multi_get(&["a"]).await.unwrap();
        assert_eq!(values, vec![Some("2".to_string())]);
    }

    #[tokio::test]
    async fn sqlite_remove() {
        let store = SqliteKeyValueStore::in_memory().await.unwrap();

        store
            .multi_set(&[("a", "1".to_string()), ("b", "2".to_string())])
            .await
            .unwrap();
        store.multi_remove(&["a", "never-set"]).await.unwrap();

        let values = store.multi_get(&["a", "b"]).await.unwrap();
        assert_eq!(values, vec![None, Some("2".to_string())]);
    }

    #[tokio::test]
    async fn sqlite_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteKeyValueStore::new(path).await.unwrap();
            store.multi_set(&[("a", "1".to_string())]).await.unwrap();
        }

        let reopened = SqliteKeyValueStore::new(path).await.unwrap();
        let values = reopened.multi_get(&["a"]).await.unwrap();
        assert_eq!(values, vec![Some("1".to_string())]);
    }

    #[tokio::test]
    async fn memory_store_behaves_like_sqlite() {
        let store = MemoryKeyValueStore::new();

        store
            .multi_set(&[("a", "1".to_string()), ("b", "2".to_string())])
            .await
            .unwrap();
        store.multi_remove(&["b"]).await.unwrap();

        let values = store.multi_get(&["a", "b"]).await.unwrap();
        assert_eq!(values, vec![Some("1".to_string()), None]);
    }
}
