//! # nabil-core: Pure Types and Logic for the Nabil Inventory Data Layer
//!
//! This crate holds everything the data layer knows that does not touch
//! storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Nabil Inventory Data Flow                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Inventory UI (React)                         │   │
//! │  │     Auth panel ──► Products ──► Categories ──► Earnings         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             nabil-sync (DataAccess context)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ nabil-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   keys    │  │  mirror   │  │   money   │  │   │
//! │  │   │   User    │  │ namespace │  │  upsert   │  │   Money   │  │   │
//! │  │   │  Config   │  │  prefix   │  │  remove   │  │  decimal  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Session record, remote configuration, collection names
//! - [`keys`] - Namespaced local storage keys
//! - [`mirror`] - Record identity and mirror recomputation
//! - [`money`] - Integer-cent money for the earnings scalar
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use nabil_core::mirror::{upsert_record, remove_record};
//! use serde_json::json;
//!
//! let rows = vec![json!({"id": "a", "qty": 1})];
//! let rows = upsert_record(rows, json!({"id": "a", "qty": 5})).unwrap();
//! assert_eq!(rows, vec![json!({"id": "a", "qty": 5})]);
//!
//! let rows = remove_record(rows, "a");
//! assert!(rows.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod keys;
pub mod mirror;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use keys::StorageKey;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix prepended to every local storage key this layer owns.
///
/// Keeps the inventory data apart from anything else sharing the store.
pub const DB_PREFIX: &str = "NabilInventory_";

/// Built-in endpoint of the hosted backend, used until an override is saved.
pub const DEFAULT_REMOTE_URL: &str = "https://flshtvylpvljyhpylweh.supabase.co";

/// Built-in publishable access key of the hosted backend.
pub const DEFAULT_REMOTE_KEY: &str = "sb_publishable_vd4QKYTDpmORhUT0dHug9g_gOlhSQ8H";

/// Identifier field every collection record carries.
pub const ID_FIELD: &str = "id";

/// Field merged into remote rows to record the owning user.
pub const OWNER_FIELD: &str = "user_id";

/// Remote table holding one profile row per user.
pub const PROFILES_TABLE: &str = "profiles";

/// Profile field storing the running earnings total.
pub const EARNINGS_FIELD: &str = "total_earnings";
