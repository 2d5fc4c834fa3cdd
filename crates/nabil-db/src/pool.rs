//! # SQLite Store
//!
//! Persistent `KeyValueStore` backed by a SQLite connection pool.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  local_storage                                                          │
//! │  ───────────────────────────────────────────────────────────────────    │
//! │  key (PK)                        │ value               │ updated_at     │
//! │  NabilInventory_CURRENT_USER     │ {"id":"u-1",...}    │ 2026-...       │
//! │  NabilInventory_products         │ [{"id":"p1",...}]   │ 2026-...       │
//! │  NabilInventory_TOTAL_EARNINGS   │ 125.5               │ 2026-...       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why WAL Mode?
//! - Readers don't block the writer
//! - Better crash recovery

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::store::KeyValueStore;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/nabil.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file, or `None` for an in-memory store.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 4
    pub max_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a configuration for a database file, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: Some(path.into()),
            max_connections: 4,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory configuration (for testing).
    ///
    /// In-memory SQLite lives inside one connection, so the pool is pinned to
    /// a single connection that never idles out.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: None,
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

// =============================================================================
// SqliteStore
// =============================================================================

/// SQLite-backed key-value store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (and if needed creates) the store.
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        let connect_options = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "Opening local store");
                SqliteConnectOptions::new()
                    .filename(path)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .create_if_missing(true)
            }
            None => {
                info!("Opening in-memory local store");
                SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            }
        };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout);
        if config.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Store pool created");

        let store = SqliteStore { pool };
        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the store can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    async fn clear(&self) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?;
        debug!(removed = result.rows_affected(), "Local store cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = SqliteStore::new(StoreConfig::in_memory()).await.unwrap();
        assert!(store.health_check().await);

        let (applied, embedded) = migrations::migration_status(store.pool()).await.unwrap();
        assert_eq!(applied, embedded);
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = SqliteStore::new(StoreConfig::in_memory()).await.unwrap();
        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("two".to_string()));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_remove_clear() {
        let store = SqliteStore::new(StoreConfig::in_memory()).await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);

        store.remove("a").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["b"]);

        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/nabil.db")
            .max_connections(2)
            .run_migrations(false);
        assert_eq!(config.max_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(StoreConfig::in_memory().is_in_memory());
    }
}
