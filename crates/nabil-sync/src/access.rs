//! # Data Access Context
//!
//! The remote-then-local policy, implemented once and shared by every
//! collection and by the scalar slots.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote-Then-Local Policy                           │
//! │                                                                         │
//! │  get_all(c)                                                            │
//! │  ──────────                                                            │
//! │   session? ──no──────────────────────────────► local mirror (or [])    │
//! │      │yes                                           ▲                   │
//! │      ▼                                              │ remote failed     │
//! │   select * order by id desc ──ok──► overwrite mirror, return rows     │
//! │                                                                         │
//! │  save_item(c, item)                    delete_item(c, id)              │
//! │  ──────────────────                    ──────────────────              │
//! │   [lock c]                              [lock c]                       │
//! │   session? upsert {item, user_id}       session? delete where id=..   │
//! │     (failure: warn, continue)             (failure: debug, continue)  │
//! │   rows := get_all(c)                    rows := get_all(c)             │
//! │   rows := rows - item.id + item         rows := rows - id              │
//! │   mirror := rows                        mirror := rows                 │
//! │                                                                         │
//! │  Remote errors never escape. Local-store errors and invalid input do.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Serialization
//! Each collection has its own async mutex. Two overlapping writes to one
//! collection run one after the other, so neither recomputes the mirror
//! from a view that misses the other's record. Reads take no lock.

use nabil_core::mirror::{remove_record, require_record_id, upsert_record, with_owner};
use nabil_core::{CollectionName, Record, RemoteConfig, User, ID_FIELD};
use nabil_db::{LocalStorage, SharedStore, SqliteStore, StoreConfig, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ClientSettings;
use crate::error::{SyncError, SyncResult};
use crate::remote::{OrderBy, OAuthRedirect, SharedAuth, SharedTables};
use crate::remote_config::{ConfigStore, Reloader};
use crate::rest::RestClient;
use crate::session::SessionManager;

// =============================================================================
// Remote Attempt
// =============================================================================

/// Outcome of a remote call made under the remote-then-local policy.
#[derive(Debug)]
pub(crate) enum Attempt<T> {
    /// No session, so the remote was not contacted.
    NoSession,
    Done(T),
    /// The remote failed; the caller falls back to local data.
    Failed(SyncError),
}

/// Where a collection read was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Remote,
    Local,
}

// =============================================================================
// Sync Report
// =============================================================================

/// Result of refreshing one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSync {
    pub collection: String,
    pub rows: usize,
    pub source: DataSource,
}

/// Result of [`DataAccess::sync_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub collections: Vec<CollectionSync>,
}

impl SyncReport {
    /// True when every collection came from the remote.
    pub fn is_complete(&self) -> bool {
        self.collections
            .iter()
            .all(|c| c.source == DataSource::Remote)
    }

    pub fn total_rows(&self) -> usize {
        self.collections.iter().map(|c| c.rows).sum()
    }
}

// =============================================================================
// Data Access
// =============================================================================

/// The data access context.
///
/// Owns the remote clients, the local store handle, and the per-collection
/// write locks. Build one per remote configuration and share it via `Arc`.
pub struct DataAccess {
    local: LocalStorage,
    tables: SharedTables,
    session: SessionManager,
    config: ConfigStore,
    write_locks: Mutex<HashMap<CollectionName, Arc<Mutex<()>>>>,
}

impl DataAccess {
    /// Assembles a context from explicit parts.
    pub fn new(
        local: LocalStorage,
        tables: SharedTables,
        auth: SharedAuth,
        app_origin: impl Into<String>,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        DataAccess {
            session: SessionManager::new(local.clone(), auth, app_origin),
            config: ConfigStore::new(local.clone(), reloader),
            local,
            tables,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Like [`DataAccess::new`], then hands any stored session tokens to
    /// the remote clients. Use this whenever the context is rebuilt over a
    /// store that may already hold a session.
    pub async fn resume(
        local: LocalStorage,
        tables: SharedTables,
        auth: SharedAuth,
        app_origin: impl Into<String>,
        reloader: Arc<dyn Reloader>,
    ) -> SyncResult<Self> {
        let access = Self::new(local, tables, auth, app_origin, reloader);
        access.session.restore().await?;
        Ok(access)
    }

    /// Builds a context over `store`, talking to the remote named by the
    /// stored (or built-in) remote configuration.
    pub async fn connect(
        store: SharedStore,
        settings: &ClientSettings,
        reloader: Arc<dyn Reloader>,
    ) -> SyncResult<Self> {
        settings.validate()?;

        let local = LocalStorage::with_keys(store, settings.storage_key());
        let remote = ConfigStore::new(local.clone(), reloader.clone())
            .get_config()
            .await?;
        let client = Arc::new(RestClient::new(&remote, settings.request_timeout())?);

        info!(
            url = %remote.url,
            prefix = %local.keys().prefix(),
            "Data access context ready"
        );
        Self::resume(
            local,
            client.clone(),
            client,
            settings.app_origin(),
            reloader,
        )
        .await
    }

    /// Opens the SQLite store named by `settings` and connects over it.
    pub async fn open(settings: &ClientSettings, reloader: Arc<dyn Reloader>) -> SyncResult<Self> {
        let path = settings.database_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::ConnectionFailed(format!("{}: {}", parent.display(), e))
            })?;
        }
        let store = SqliteStore::new(StoreConfig::new(&path)).await?;
        if !store.health_check().await {
            return Err(StoreError::ConnectionFailed(format!(
                "{}: store does not answer queries",
                path.display()
            ))
            .into());
        }
        Self::connect(Arc::new(store), settings, reloader).await
    }

    pub fn local(&self) -> &LocalStorage {
        &self.local
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    // =========================================================================
    // Session and Config Shortcuts
    // =========================================================================

    pub async fn get_user(&self) -> SyncResult<Option<User>> {
        self.session.get_user().await
    }

    pub async fn save_user(&self, user: &User) -> SyncResult<()> {
        self.session.save_user(user).await
    }

    pub async fn logout(&self) -> SyncResult<()> {
        self.session.logout().await
    }

    pub async fn sign_in_with_github(&self) -> SyncResult<OAuthRedirect> {
        self.session.sign_in_with_github().await
    }

    pub async fn clear_local_data(&self) -> SyncResult<usize> {
        self.session.clear_local_data().await
    }

    pub async fn get_config(&self) -> SyncResult<RemoteConfig> {
        self.config.get_config().await
    }

    pub async fn save_config(&self, url: &str, key: &str) -> SyncResult<()> {
        self.config.save_config(url, key).await
    }

    // =========================================================================
    // Policy Core
    // =========================================================================

    /// Runs `call` against the remote if a session exists.
    ///
    /// Remote failures come back as `Attempt::Failed`; any other error
    /// propagates.
    pub(crate) async fn attempt<T, F, Fut>(&self, call: F) -> SyncResult<Attempt<T>>
    where
        F: FnOnce(User) -> Fut,
        Fut: Future<Output = SyncResult<T>>,
    {
        let Some(user) = self.session.get_user().await? else {
            return Ok(Attempt::NoSession);
        };
        match call(user).await {
            Ok(value) => Ok(Attempt::Done(value)),
            Err(e) if e.is_remote() => Ok(Attempt::Failed(e)),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn tables(&self) -> &SharedTables {
        &self.tables
    }

    async fn write_lock(&self, name: &CollectionName) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks.entry(name.clone()).or_default().clone()
    }

    /// Freshest view of a collection plus where it came from.
    async fn read_through(&self, name: &CollectionName) -> SyncResult<(Vec<Value>, DataSource)> {
        let order = &OrderBy::id_desc();
        let attempt = self
            .attempt(move |_user| self.tables.select_all(name.as_str(), order))
            .await?;

        match attempt {
            Attempt::Done(rows) => {
                self.local.collections().replace(name, &rows).await?;
                debug!(collection = %name, rows = rows.len(), "Mirror refreshed from remote");
                return Ok((rows, DataSource::Remote));
            }
            Attempt::Failed(e) => {
                warn!(collection = %name, ?e, "Remote read failed, serving local mirror");
            }
            Attempt::NoSession => {}
        }

        let rows = self.local.collections().load(name).await?;
        Ok((rows, DataSource::Local))
    }

    // =========================================================================
    // Collection Operations
    // =========================================================================

    /// Every record of a collection, newest id first when served remotely.
    pub async fn get_all(&self, collection: &str) -> SyncResult<Vec<Value>> {
        let name = CollectionName::new(collection)?;
        let (rows, _) = self.read_through(&name).await?;
        Ok(rows)
    }

    /// Creates or replaces a record.
    ///
    /// The remote row carries `user_id` of the signed-in user; the local
    /// mirror keeps the item exactly as given.
    pub async fn save_item(&self, collection: &str, item: Value) -> SyncResult<()> {
        let name = CollectionName::new(collection)?;
        let id = require_record_id(name.as_str(), &item)?;

        let lock = self.write_lock(&name).await;
        let _guard = lock.lock().await;

        let table = name.as_str();
        let source = &item;
        let attempt = self
            .attempt(move |user| async move {
                let row = with_owner(source, &user.id);
                self.tables.upsert(table, &row).await
            })
            .await?;
        if let Attempt::Failed(e) = attempt {
            warn!(collection = %name, id = %id, ?e, "Remote save failed, saving locally only");
        }

        let (current, _) = self.read_through(&name).await?;
        let updated = upsert_record(current, item)?;
        self.local.collections().replace(&name, &updated).await?;

        debug!(collection = %name, id = %id, rows = updated.len(), "Item saved");
        Ok(())
    }

    /// Deletes a record by id. Deleting an absent id is not an error.
    pub async fn delete_item(&self, collection: &str, id: &str) -> SyncResult<()> {
        let name = CollectionName::new(collection)?;

        let lock = self.write_lock(&name).await;
        let _guard = lock.lock().await;

        let table = name.as_str();
        let attempt = self
            .attempt(move |_user| self.tables.delete_eq(table, ID_FIELD, id))
            .await?;
        if let Attempt::Failed(e) = attempt {
            debug!(collection = %name, id, ?e, "Remote delete failed, deleting locally only");
        }

        let (current, _) = self.read_through(&name).await?;
        let updated = remove_record(current, id);
        self.local.collections().replace(&name, &updated).await?;

        debug!(collection = %name, id, rows = updated.len(), "Item deleted");
        Ok(())
    }

    /// Typed view of a collection.
    pub fn collection<T: Record>(&self, name: &str) -> SyncResult<Collection<'_, T>> {
        Ok(Collection {
            access: self,
            name: CollectionName::new(name)?,
            _marker: PhantomData,
        })
    }

    /// Refreshes each named collection from the remote.
    ///
    /// Collections the remote could not serve are reported with
    /// `DataSource::Local` and their mirror untouched.
    pub async fn sync_all(&self, collections: &[&str]) -> SyncResult<SyncReport> {
        let names = collections
            .iter()
            .map(|c| CollectionName::new(*c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = SyncReport {
            collections: Vec::with_capacity(names.len()),
        };
        for name in names {
            let (rows, source) = self.read_through(&name).await?;
            report.collections.push(CollectionSync {
                collection: name.to_string(),
                rows: rows.len(),
                source,
            });
        }

        info!(
            collections = report.collections.len(),
            rows = report.total_rows(),
            complete = report.is_complete(),
            "Sync finished"
        );
        Ok(report)
    }
}

// =============================================================================
// Typed Collection Handle
// =============================================================================

/// A collection of `T` records, backed by the JSON operations.
pub struct Collection<'a, T> {
    access: &'a DataAccess,
    name: CollectionName,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<'_, T> {
    pub fn name(&self) -> &CollectionName {
        &self.name
    }

    pub async fn all(&self) -> SyncResult<Vec<T>> {
        let rows = self.access.get_all(self.name.as_str()).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    SyncError::DeserializationFailed(format!("{}: {}", self.name, e))
                })
            })
            .collect()
    }

    pub async fn find(&self, id: &str) -> SyncResult<Option<T>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|record| record.record_id() == id))
    }

    pub async fn save(&self, record: &T) -> SyncResult<()> {
        let value = serde_json::to_value(record)?;
        self.access.save_item(self.name.as_str(), value).await
    }

    pub async fn delete(&self, id: &str) -> SyncResult<()> {
        self.access.delete_item(self.name.as_str(), id).await
    }
}
