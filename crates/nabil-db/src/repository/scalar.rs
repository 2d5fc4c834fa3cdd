//! # Scalar Repository
//!
//! Single-value slots stored as decimal strings, e.g. the earnings total.

use nabil_core::{Money, StorageKey};
use tracing::warn;

use crate::error::StoreResult;
use crate::store::SharedStore;

/// Repository for money-valued slots.
#[derive(Clone)]
pub struct ScalarRepository {
    store: SharedStore,
    keys: StorageKey,
}

impl ScalarRepository {
    pub fn new(store: SharedStore, keys: StorageKey) -> Self {
        ScalarRepository { store, keys }
    }

    /// Loads a slot.
    ///
    /// Missing and unparseable values both read as `None`; the latter is
    /// logged since it means something else wrote the key.
    pub async fn load_money(&self, slot: &str) -> StoreResult<Option<Money>> {
        let key = self.keys.namespaced(slot);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        match Money::parse_decimal(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, ?e, "Ignoring unparseable scalar");
                Ok(None)
            }
        }
    }

    /// Stores a slot in decimal form (`12.5`, `0`, `-3.25`).
    pub async fn save_money(&self, slot: &str, value: Money) -> StoreResult<()> {
        let key = self.keys.namespaced(slot);
        self.store.set(&key, &value.to_decimal().to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use nabil_core::keys::TOTAL_EARNINGS;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_money_slot() {
        let store = MemoryStore::new();
        let repo = ScalarRepository::new(Arc::new(store.clone()), StorageKey::default());
        assert_eq!(repo.load_money(TOTAL_EARNINGS).await.unwrap(), None);

        repo.save_money(TOTAL_EARNINGS, Money::from_cents(12550))
            .await
            .unwrap();
        assert_eq!(
            store.get("NabilInventory_TOTAL_EARNINGS").await.unwrap(),
            Some("125.5".to_string())
        );
        assert_eq!(
            repo.load_money(TOTAL_EARNINGS).await.unwrap(),
            Some(Money::from_cents(12550))
        );
    }

    #[tokio::test]
    async fn test_garbage_reads_as_none() {
        let store = MemoryStore::new();
        let repo = ScalarRepository::new(Arc::new(store.clone()), StorageKey::default());
        store
            .set("NabilInventory_TOTAL_EARNINGS", "lots")
            .await
            .unwrap();
        assert_eq!(repo.load_money(TOTAL_EARNINGS).await.unwrap(), None);

        // Whole-string parse: trailing junk is not ignored.
        store
            .set("NabilInventory_TOTAL_EARNINGS", "12.5abc")
            .await
            .unwrap();
        assert_eq!(repo.load_money(TOTAL_EARNINGS).await.unwrap(), None);
    }
}
