//! # Local Storage Handle
//!
//! Entry point that hands out namespaced repositories over one store.
//!
//! ## Usage
//! ```rust,ignore
//! let store = SqliteStore::new(StoreConfig::new("nabil.db")).await?;
//! let local = LocalStorage::new(Arc::new(store));
//!
//! let products = local.collections().load(&name).await?;
//! let user = local.session().load().await?;
//! ```

use nabil_core::StorageKey;
use std::sync::Arc;
use tracing::info;

use crate::error::StoreResult;
use crate::repository::{
    CollectionRepository, ScalarRepository, SessionRepository, SettingsRepository,
};
use crate::store::{KeyValueStore, SharedStore};

/// Handle to the local store plus its key namespace.
#[derive(Clone)]
pub struct LocalStorage {
    store: SharedStore,
    keys: StorageKey,
}

impl LocalStorage {
    /// Wraps a store with the default `NabilInventory_` namespace.
    pub fn new(store: SharedStore) -> Self {
        Self::with_keys(store, StorageKey::default())
    }

    /// Wraps a store with a custom namespace.
    pub fn with_keys(store: SharedStore, keys: StorageKey) -> Self {
        LocalStorage { store, keys }
    }

    /// Convenience constructor from a concrete store.
    pub fn from_store<S: KeyValueStore + 'static>(store: S) -> Self {
        Self::new(Arc::new(store))
    }

    pub fn keys(&self) -> &StorageKey {
        &self.keys
    }

    /// The underlying store, for operations outside any namespace.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn collections(&self) -> CollectionRepository {
        CollectionRepository::new(self.store.clone(), self.keys.clone())
    }

    pub fn session(&self) -> SessionRepository {
        SessionRepository::new(self.store.clone(), self.keys.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.store.clone(), self.keys.clone())
    }

    pub fn scalars(&self) -> ScalarRepository {
        ScalarRepository::new(self.store.clone(), self.keys.clone())
    }

    /// Removes every key in this namespace, leaving other keys alone.
    ///
    /// Returns the number of keys removed.
    pub async fn clear_namespace(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for key in self.store.keys().await? {
            if self.keys.owns(&key) {
                self.store.remove(&key).await?;
                removed += 1;
            }
        }
        info!(prefix = %self.keys.prefix(), removed, "Namespace cleared");
        Ok(removed)
    }

    /// Removes every key in the store, including keys of other namespaces.
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.store.clear().await?;
        info!("Local store wiped");
        Ok(())
    }
}
