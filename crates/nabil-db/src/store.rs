//! # Key-Value Store
//!
//! The local persistent store abstraction and its in-memory backend.
//!
//! ## Store Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       KeyValueStore                                     │
//! │                                                                         │
//! │  get(key)        → Option<String>    missing key is not an error       │
//! │  set(key, value) → ()                overwrites unconditionally        │
//! │  remove(key)     → ()                missing key is not an error       │
//! │  keys()          → Vec<String>       every key, any namespace          │
//! │  clear()         → ()                every key, any namespace          │
//! │                                                                         │
//! │  Backends:                                                             │
//! │  • MemoryStore  (this file)  tests, ephemeral sessions                 │
//! │  • SqliteStore  (pool.rs)    the persistent store on a device          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings; the repositories decide what JSON lives in
//! them.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreResult;

/// A string-to-string persistent store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a value.
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Lists every key in the store.
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Deletes every key in the store.
    async fn clear(&self) -> StoreResult<()>;
}

/// Shared handle to any store backend.
pub type SharedStore = Arc<dyn KeyValueStore>;

// =============================================================================
// In-Memory Store
// =============================================================================

/// A `KeyValueStore` held in process memory.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic_ops() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("a", "3").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some("3".to_string()));
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);

        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.len().await, 1);

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap(), Some("v".to_string()));
    }
}
