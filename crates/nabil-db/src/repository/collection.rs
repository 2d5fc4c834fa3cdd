//! # Collection Repository
//!
//! Reads and writes collection mirrors: one JSON array per collection.

use nabil_core::{CollectionName, StorageKey};
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::SharedStore;

/// Repository for collection mirrors.
#[derive(Clone)]
pub struct CollectionRepository {
    store: SharedStore,
    keys: StorageKey,
}

impl CollectionRepository {
    pub fn new(store: SharedStore, keys: StorageKey) -> Self {
        CollectionRepository { store, keys }
    }

    /// Loads a mirror.
    ///
    /// A never-written mirror is an empty collection. A value that is not a
    /// JSON array is reported as corrupt rather than silently dropped.
    pub async fn load(&self, name: &CollectionName) -> StoreResult<Vec<Value>> {
        let key = self.keys.collection(name);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(other) => Err(StoreError::corrupt(
                key,
                format!("expected an array, found {}", json_kind(&other)),
            )),
            Err(e) => Err(StoreError::corrupt(key, e)),
        }
    }

    /// Replaces a mirror wholesale.
    pub async fn replace(&self, name: &CollectionName, rows: &[Value]) -> StoreResult<()> {
        let key = self.keys.collection(name);
        let raw = serde_json::to_string(rows)?;
        self.store.set(&key, &raw).await?;
        debug!(collection = %name, rows = rows.len(), "Mirror replaced");
        Ok(())
    }

    /// Returns true if the mirror has ever been written.
    pub async fn exists(&self, name: &CollectionName) -> StoreResult<bool> {
        Ok(self.store.get(&self.keys.collection(name)).await?.is_some())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
