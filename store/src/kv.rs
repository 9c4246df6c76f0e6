//! Durable key-value store trait and the in-memory backend.

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use serde_json::Value;

use salarium_common::{now, Timestamp};

use crate::error::StoreResult;

/// A stored value with its write timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    /// The stored document.
    pub value: Value,
    /// When the entry was written.
    pub stored_at: Timestamp,
}

impl StoredEntry {
    /// Create an entry stamped now.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            stored_at: now(),
        }
    }

    /// Whether the entry is younger than the given maximum age.
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        now().signed_duration_since(self.stored_at) < max_age
    }
}

/// Local persistent key-value/document store.
///
/// The core needs only put/get/scan-by-prefix plus an expiry-aware read for
/// cached rates.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Write a value, replacing any existing entry for the key.
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Read a value.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredEntry>>;

    /// Read all entries whose key starts with the prefix, ordered by key.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, StoredEntry)>>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Read a value only if it was written within `max_age`.
    async fn get_fresh(&self, key: &str, max_age: Duration) -> StoreResult<Option<StoredEntry>> {
        Ok(self.get(key).await?.filter(|e| e.is_fresh(max_age)))
    }
}

/// In-memory store backend, used in tests and as the default until a
/// database is configured.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), StoredEntry::new(value));
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<StoredEntry>> {
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, StoredEntry)>> {
        let mut entries: Vec<(String, StoredEntry)> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();

        store.put("rate/EUR/USD", json!({"rate": "1.09"})).await.unwrap();

        let entry = store.get("rate/EUR/USD").await.unwrap().unwrap();
        assert_eq!(entry.value["rate"], "1.09");

        store.delete("rate/EUR/USD").await.unwrap();
        assert!(store.get("rate/EUR/USD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_prefix_ordering() {
        let store = MemoryStore::new();
        store.put("snapshot/b", json!(2)).await.unwrap();
        store.put("snapshot/a", json!(1)).await.unwrap();
        store.put("rate/EUR/USD", json!(3)).await.unwrap();

        let entries = store.scan_prefix("snapshot/").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["snapshot/a", "snapshot/b"]);
    }

    #[tokio::test]
    async fn test_get_fresh_respects_age() {
        let store = MemoryStore::new();
        store.put("rate/EUR/USD", json!(1)).await.unwrap();

        assert!(store
            .get_fresh("rate/EUR/USD", Duration::minutes(15))
            .await
            .unwrap()
            .is_some());

        // Backdate the entry past the freshness window.
        let mut entry = store.entries.get_mut("rate/EUR/USD").unwrap();
        entry.stored_at = now() - Duration::minutes(16);
        drop(entry);

        assert!(store
            .get_fresh("rate/EUR/USD", Duration::minutes(15))
            .await
            .unwrap()
            .is_none());
    }
}
