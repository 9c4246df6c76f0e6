//! SQLite-backed durable store.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::kv::{DurableStore, StoredEntry};

/// Durable store backed by a local SQLite file.
///
/// A single `kv` table with upsert semantics; values are stored as JSON
/// text alongside their write timestamp.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at the given URL, e.g.
    /// `sqlite://salarium.db` or `sqlite::memory:`.
    pub async fn open(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        info!(url, "Opened SQLite store");

        Ok(Self { pool })
    }

    fn row_to_entry(value: String, stored_at: String) -> StoreResult<StoredEntry> {
        let value: Value = serde_json::from_str(&value)?;
        let stored_at = DateTime::parse_from_rfc3339(&stored_at)
            .map_err(|e| StoreError::Serialization(e.to_string()))?
            .with_timezone(&Utc);
        Ok(StoredEntry { value, stored_at })
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        let entry = StoredEntry::new(value);
        sqlx::query(
            "INSERT INTO kv (key, value, stored_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 stored_at = excluded.stored_at",
        )
        .bind(key)
        .bind(serde_json::to_string(&entry.value)?)
        .bind(entry.stored_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredEntry>> {
        let row = sqlx::query("SELECT value, stored_at FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row.get("value");
                let stored_at: String = row.get("stored_at");
                Ok(Some(Self::row_to_entry(value, stored_at)?))
            }
            None => Ok(None),
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, StoredEntry)>> {
        // LIKE-based scan; keys are internal and never contain wildcards.
        let pattern = format!("{}%", prefix);
        let rows = sqlx::query("SELECT key, value, stored_at FROM kv WHERE key LIKE ?1 ORDER BY key")
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.get("key");
            let value: String = row.get("value");
            let stored_at: String = row.get("stored_at");
            entries.push((key, Self::row_to_entry(value, stored_at)?));
        }
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
