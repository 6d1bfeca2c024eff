use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

use rocketshoes_core::{KeyValueStore, StoreError};

use super::RepositoryError;
use crate::DbPool;

/// SQLite-backed string store; each key holds one wholesale value.
pub struct SqlKeyValueStore {
    pool: DbPool,
}

impl SqlKeyValueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM key_value_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| row.try_get::<String, _>("value"))
            .transpose()
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }

    pub async fn upsert(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO key_value_store (key, value, updated_at)
             VALUES (?, ?, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(event_name = "store.kv.upsert", key, bytes = value.len(), "stored value");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.find(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.upsert(key, value).await?)
    }
}
