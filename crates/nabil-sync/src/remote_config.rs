//! # Remote Configuration Store
//!
//! Endpoint URL and public key of the hosted backend, overridable from the
//! sign-in panel and persisted in the local store.
//!
//! ## Reload Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Saving a New Remote Config                        │
//! │                                                                         │
//! │  AuthPanel::save_config                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ConfigStore::save_config(url, key)                                    │
//! │       │  1. persist SUPABASE_URL / SUPABASE_KEY                        │
//! │       │  2. Reloader::request_reload()                                 │
//! │       ▼                                                                 │
//! │  ReloadSignal ──watch──► host task                                     │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                 DataAccess::connect(...) again, which reads the new    │
//! │                 values through ConfigStore::get_config                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use nabil_core::RemoteConfig;
use nabil_db::LocalStorage;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::SyncResult;

// =============================================================================
// Reloader
// =============================================================================

/// Something that can rebuild the data access context.
pub trait Reloader: Send + Sync {
    fn request_reload(&self);
}

/// `Reloader` backed by a watch channel.
///
/// Each request bumps a generation counter; the host awaits
/// [`ReloadSignal::subscribe`] receivers and rebuilds on change.
#[derive(Clone)]
pub struct ReloadSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl ReloadSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        ReloadSignal { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of reloads requested so far.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Reloader for ReloadSignal {
    fn request_reload(&self) {
        // send_modify succeeds with no receivers, unlike send.
        self.tx.send_modify(|generation| *generation += 1);
        debug!(generation = self.generation(), "Reload requested");
    }
}

// =============================================================================
// Config Store
// =============================================================================

/// Reads and writes the remote endpoint configuration.
#[derive(Clone)]
pub struct ConfigStore {
    local: LocalStorage,
    reloader: Arc<dyn Reloader>,
}

impl ConfigStore {
    pub fn new(local: LocalStorage, reloader: Arc<dyn Reloader>) -> Self {
        ConfigStore { local, reloader }
    }

    /// Effective remote configuration.
    ///
    /// The stored override wins only when both URL and key are present;
    /// otherwise the built-in defaults are returned. Values are not
    /// validated.
    pub async fn get_config(&self) -> SyncResult<RemoteConfig> {
        let config = self
            .local
            .settings()
            .remote_override()
            .await?
            .unwrap_or_default();
        Ok(config)
    }

    /// Persists a new URL and key, then asks the host to reload.
    pub async fn save_config(&self, url: &str, key: &str) -> SyncResult<()> {
        let config = RemoteConfig::new(url, key);
        self.local.settings().save_remote(&config).await?;
        info!(url = %config.url, "Remote config saved");

        self.reloader.request_reload();
        Ok(())
    }
}
