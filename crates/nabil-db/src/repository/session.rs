//! # Session Repository
//!
//! Holds the serialized session record and the bearer tokens that go with
//! it. The two live under separate keys: the user record is what the UI
//! reads, the tokens are only handed to the remote client.

use nabil_core::{AuthTokens, StorageKey, User};
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::store::SharedStore;

/// Repository for the session record.
#[derive(Clone)]
pub struct SessionRepository {
    store: SharedStore,
    keys: StorageKey,
}

impl SessionRepository {
    pub fn new(store: SharedStore, keys: StorageKey) -> Self {
        SessionRepository { store, keys }
    }

    async fn load_json<T: DeserializeOwned>(&self, key: String) -> StoreResult<Option<T>> {
        match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    /// Loads the session record, if any.
    pub async fn load(&self) -> StoreResult<Option<User>> {
        self.load_json(self.keys.current_user()).await
    }

    /// Overwrites the session record. Stored tokens are left as they are.
    pub async fn save(&self, user: &User) -> StoreResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(&self.keys.current_user(), &raw).await
    }

    /// Loads the stored bearer tokens, if any.
    pub async fn load_tokens(&self) -> StoreResult<Option<AuthTokens>> {
        self.load_json(self.keys.auth_tokens()).await
    }

    /// Overwrites the stored bearer tokens.
    pub async fn save_tokens(&self, tokens: &AuthTokens) -> StoreResult<()> {
        let raw = serde_json::to_string(tokens)?;
        self.store.set(&self.keys.auth_tokens(), &raw).await
    }
}
