//! # nabil-sync: Remote-Then-Local Data Access for Nabil Inventory
//!
//! This crate is the data access layer the inventory UI talks to. Every
//! read and write tries the hosted backend when a user is signed in and
//! always keeps a local mirror, so the app works the same offline.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Data Access Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    DataAccess (explicit context)                  │  │
//! │  │                                                                  │  │
//! │  │  get_all / save_item / delete_item / collection::<T>()           │  │
//! │  │  get_earnings / save_earnings / sync_all / snapshots             │  │
//! │  └──────┬──────────────────────┬──────────────────────┬─────────────┘  │
//! │         ▼                      ▼                      ▼                 │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionManager │  │  ConfigStore   │  │  RemoteTables          │    │
//! │  │                │  │                │  │  RemoteAuth            │    │
//! │  │ CURRENT_USER   │  │ URL + key      │  │                        │    │
//! │  │ login, logout  │  │ ReloadSignal   │  │  RestClient (reqwest)  │    │
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────┘    │
//! │          └───────────┬───────┘                                         │
//! │                      ▼                                                  │
//! │           nabil-db LocalStorage (SQLite or memory)                     │
//! │                                                                         │
//! │  AuthPanel drives the sign-in panel on top of DataAccess.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`access`] - `DataAccess` context and the remote-then-local policy
//! - [`scalar`] - Scalar slots (earnings)
//! - [`snapshot`] - JSON export/import of collections
//! - [`session`] - Session record and sign-in flows
//! - [`remote_config`] - Remote URL/key and the reload signal
//! - [`remote`] - Remote service traits
//! - [`rest`] - HTTPS implementation of the remote traits
//! - [`auth_panel`] - Headless sign-in panel controller
//! - [`config`] - Client settings file
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nabil_sync::{ClientSettings, DataAccess, ReloadSignal};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let settings = ClientSettings::load_or_default(None);
//! let reload = ReloadSignal::new();
//! let access = DataAccess::open(&settings, Arc::new(reload.clone())).await?;
//!
//! access.save_item("products", json!({"id": "p1", "name": "Tea"})).await?;
//! let products = access.get_all("products").await?;
//! let earnings = access.get_earnings().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod auth_panel;
pub mod config;
pub mod error;
pub mod remote;
pub mod remote_config;
pub mod rest;
pub mod scalar;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use access::{Collection, CollectionSync, DataAccess, DataSource, SyncReport};
pub use auth_panel::{AuthMode, AuthPanel, Notice, NoticeKind, PanelView, Submission};
pub use config::ClientSettings;
pub use error::{SyncError, SyncResult};
pub use remote::{
    AuthSession, OAuthProvider, OAuthRedirect, OrderBy, RemoteAuth, RemoteTables, SignUpOutcome,
    SortOrder,
};
pub use remote_config::{ConfigStore, ReloadSignal, Reloader};
pub use rest::RestClient;
pub use scalar::{ScalarSlot, EARNINGS};
pub use session::SessionManager;
pub use snapshot::Snapshot;
