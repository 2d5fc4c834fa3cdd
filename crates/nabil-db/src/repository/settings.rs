//! # Settings Repository
//!
//! Stores the user's remote endpoint/key override.

use nabil_core::{RemoteConfig, StorageKey};

use crate::error::StoreResult;
use crate::store::SharedStore;

/// Repository for the remote configuration override.
#[derive(Clone)]
pub struct SettingsRepository {
    store: SharedStore,
    keys: StorageKey,
}

impl SettingsRepository {
    pub fn new(store: SharedStore, keys: StorageKey) -> Self {
        SettingsRepository { store, keys }
    }

    /// Returns the override only when both URL and key are stored and
    /// non-empty.
    pub async fn remote_override(&self) -> StoreResult<Option<RemoteConfig>> {
        let url = self.store.get(&self.keys.remote_url()).await?;
        let key = self.store.get(&self.keys.remote_key()).await?;
        Ok(match (url, key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some(RemoteConfig { url, key })
            }
            _ => None,
        })
    }

    /// Persists both override values.
    pub async fn save_remote(&self, config: &RemoteConfig) -> StoreResult<()> {
        self.store.set(&self.keys.remote_url(), &config.url).await?;
        self.store.set(&self.keys.remote_key(), &config.key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_override_requires_both_values() {
        let store = MemoryStore::new();
        let repo = SettingsRepository::new(Arc::new(store.clone()), StorageKey::default());
        assert_eq!(repo.remote_override().await.unwrap(), None);

        store
            .set("NabilInventory_SUPABASE_URL", "https://x.example")
            .await
            .unwrap();
        assert_eq!(repo.remote_override().await.unwrap(), None);

        store.set("NabilInventory_SUPABASE_KEY", "").await.unwrap();
        assert_eq!(repo.remote_override().await.unwrap(), None);

        store.set("NabilInventory_SUPABASE_KEY", "k").await.unwrap();
        assert_eq!(
            repo.remote_override().await.unwrap(),
            Some(RemoteConfig::new("https://x.example", "k"))
        );
    }

    #[tokio::test]
    async fn test_save_remote() {
        let repo = SettingsRepository::new(Arc::new(MemoryStore::new()), StorageKey::default());
        let config = RemoteConfig::new("https://y.example", "key-2");
        repo.save_remote(&config).await.unwrap();
        assert_eq!(repo.remote_override().await.unwrap(), Some(config));
    }
}
