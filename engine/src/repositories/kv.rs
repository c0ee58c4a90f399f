//! Key-value storage for small settings

use async_trait::async_trait;
use frisky_shared::StoreError;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Generic key-value store, the equivalent of platform user defaults
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Key-value store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store backed by the `kv` table, values stored as JSON text
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        raw.map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let text = serde_json::to_string(&value)?;
        sqlx::query(
            r#"
            INSERT INTO kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_get_set() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        store.set("answer", json!(42)).await.unwrap();
        assert_eq!(store.get("answer").await.unwrap(), Some(json!(42)));
    }

    #[tokio::test]
    async fn test_sqlite_persists_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frisky.db");
        {
            let pool = db::create_pool(&path, 1).await.unwrap();
            db::run_migrations(&pool).await.unwrap();
            let store = SqliteKeyValueStore::new(pool.clone());
            store.set("last_check_date", json!("2024-06-11")).await.unwrap();
            store.set("last_check_date", json!("2024-06-12")).await.unwrap();
            store.set("celebrated_goals", json!(["a", "b"])).await.unwrap();
            pool.close().await;
        }

        let pool = db::create_pool(&path, 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let reopened = SqliteKeyValueStore::new(pool);
        assert_eq!(
            reopened.get("last_check_date").await.unwrap(),
            Some(json!("2024-06-12"))
        );
        assert_eq!(
            reopened.get("celebrated_goals").await.unwrap(),
            Some(json!(["a", "b"]))
        );
        assert!(reopened.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_malformed_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::create_pool(&dir.path().join("frisky.db"), 1).await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        sqlx::query("INSERT INTO kv (key, value) VALUES ('celebrated_goals', '{ not json')")
            .execute(&pool)
            .await
            .unwrap();

        let store = SqliteKeyValueStore::new(pool);
        let result = store.get("celebrated_goals").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
