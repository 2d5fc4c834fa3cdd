//! # nabil-db: Local Storage for the Nabil Inventory Data Layer
//!
//! This crate provides the local persistent key-value store that mirrors
//! remote collections and keeps the session record.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Nabil Inventory Data Flow                          │
//! │                                                                         │
//! │  DataAccess::get_all("products")                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     nabil-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ LocalStorage  │    │  Repositories │    │    Stores    │  │   │
//! │  │   │  (local.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ Collection    │    │ SqliteStore  │  │   │
//! │  │   │ namespace     │───►│ Session       │───►│ MemoryStore  │  │   │
//! │  │   │ clear ops     │    │ Settings      │    │              │  │   │
//! │  │   │               │    │ Scalar        │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `KeyValueStore` trait and in-memory backend
//! - [`pool`] - SQLite backend
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Namespaced repositories
//! - [`local`] - `LocalStorage` handle
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nabil_db::{LocalStorage, SqliteStore, StoreConfig};
//!
//! let store = SqliteStore::new(StoreConfig::new("nabil.db")).await?;
//! let local = LocalStorage::from_store(store);
//! let user = local.session().load().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod local;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use local::LocalStorage;
pub use pool::{SqliteStore, StoreConfig};
pub use store::{KeyValueStore, MemoryStore, SharedStore};

pub use repository::{
    CollectionRepository, ScalarRepository, SessionRepository, SettingsRepository,
};
