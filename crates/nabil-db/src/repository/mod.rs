//! # Repository Module
//!
//! Namespaced views over a [`KeyValueStore`](crate::store::KeyValueStore).
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DataAccess (nabil-sync)                                               │
//! │       │                                                                 │
//! │       │  local.collections().load(&products)                           │
//! │       ▼                                                                 │
//! │  CollectionRepository                                                  │
//! │  ├── load(&self, name)        → Vec<Value>                             │
//! │  └── replace(&self, name, rows)                                        │
//! │       │                                                                 │
//! │       │  "NabilInventory_products" → "[...]"                            │
//! │       ▼                                                                 │
//! │  KeyValueStore (SQLite / memory)                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Key naming and JSON shape live in one place                         │
//! │  • Callers never see raw strings                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CollectionRepository`] - Collection mirrors
//! - [`SessionRepository`] - The session record
//! - [`SettingsRepository`] - Remote configuration override
//! - [`ScalarRepository`] - Single-value slots such as the earnings total

pub mod collection;
pub mod scalar;
pub mod session;
pub mod settings;

pub use collection::CollectionRepository;
pub use scalar::ScalarRepository;
pub use session::SessionRepository;
pub use settings::SettingsRepository;
