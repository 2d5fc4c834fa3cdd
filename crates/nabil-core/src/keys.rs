//! # Storage Keys
//!
//! Every key this layer writes to the local store, built in one place.
//!
//! ## Key Layout
//! ```text
//! NabilInventory_CURRENT_USER     → serialized User
//! NabilInventory_AUTH_TOKENS      → serialized AuthTokens
//! NabilInventory_SUPABASE_URL     → endpoint override
//! NabilInventory_SUPABASE_KEY     → access key override
//! NabilInventory_TOTAL_EARNINGS   → decimal string, e.g. "125.5"
//! NabilInventory_<collection>     → serialized JSON array of records
//! ```
//!
//! Collection names are validated identifiers and may not be one of the
//! [`RESERVED_KEYS`], so a mirror never lands on a fixed key.

use crate::types::CollectionName;
use crate::DB_PREFIX;

pub const CURRENT_USER: &str = "CURRENT_USER";
pub const REMOTE_URL: &str = "SUPABASE_URL";
pub const REMOTE_KEY: &str = "SUPABASE_KEY";
pub const TOTAL_EARNINGS: &str = "TOTAL_EARNINGS";
pub const AUTH_TOKENS: &str = "AUTH_TOKENS";

/// Fixed key suffixes; no collection may be named after one.
pub const RESERVED_KEYS: [&str; 5] = [
    CURRENT_USER,
    AUTH_TOKENS,
    REMOTE_URL,
    REMOTE_KEY,
    TOTAL_EARNINGS,
];

/// Builder for namespaced storage keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    prefix: String,
}

impl Default for StorageKey {
    fn default() -> Self {
        StorageKey::new(DB_PREFIX)
    }
}

impl StorageKey {
    /// Creates a key builder with a custom prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        StorageKey {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `key` belongs to this namespace.
    pub fn owns(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Prefixes an arbitrary suffix.
    pub fn namespaced(&self, suffix: &str) -> String {
        format!("{}{}", self.prefix, suffix)
    }

    pub fn current_user(&self) -> String {
        self.namespaced(CURRENT_USER)
    }

    pub fn auth_tokens(&self) -> String {
        self.namespaced(AUTH_TOKENS)
    }

    pub fn remote_url(&self) -> String {
        self.namespaced(REMOTE_URL)
    }

    pub fn remote_key(&self) -> String {
        self.namespaced(REMOTE_KEY)
    }

    pub fn total_earnings(&self) -> String {
        self.namespaced(TOTAL_EARNINGS)
    }

    /// Key of a collection's local mirror.
    pub fn collection(&self, name: &CollectionName) -> String {
        self.namespaced(name.as_str())
    }
}
