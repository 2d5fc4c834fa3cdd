//! # Domain Types
//!
//! Types shared by the local store and the remote data access layer.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │  RemoteConfig   │   │ CollectionName  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  url            │   │  "products"     │       │
//! │  │  email          │   │  key            │   │  "categories"   │       │
//! │  │  user_metadata  │   │                 │   │  (validated)    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Record (trait)  - any serde type with a unique string id       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Semantics
//! A stored [`User`] means "someone logged in on this device". Its presence
//! gates remote calls; nothing here checks that the remote session is still
//! valid.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::validate_collection_name;
use crate::{DEFAULT_REMOTE_KEY, DEFAULT_REMOTE_URL};

// =============================================================================
// User (Session Record)
// =============================================================================

/// The authenticated identity, as returned by the auth service.
///
/// Unknown fields are kept in `extra` so that a record written back to
/// storage is the same record that was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    /// Identity id; doubles as the owner id on remote rows.
    pub id: String,

    /// Email address, when the provider shares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Provider profile data (name, avatar, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    #[ts(type = "Record<string, unknown>")]
    pub user_metadata: Map<String, Value>,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Creates a user with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        User {
            id: id.into(),
            email: None,
            user_metadata: Map::new(),
            extra: Map::new(),
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name to show in the account view.
    ///
    /// Prefers provider names, then the email address.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "full_name", "user_name"]
            .iter()
            .find_map(|k| self.user_metadata.get(*k).and_then(Value::as_str))
            .or(self.email.as_deref())
    }

    /// Avatar image URL, if the provider supplied one.
    pub fn avatar_url(&self) -> Option<&str> {
        ["picture", "avatar_url"]
            .iter()
            .find_map(|k| self.user_metadata.get(*k).and_then(Value::as_str))
    }
}

// =============================================================================
// Auth Tokens
// =============================================================================

/// Bearer credentials of the remote session.
///
/// Stored next to the session record so a rebuilt context keeps talking to
/// the remote as the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        AuthTokens {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

// =============================================================================
// Remote Configuration
// =============================================================================

/// Connection settings for the hosted backend.
///
/// No format validation is applied: whatever the user saves is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RemoteConfig {
    /// Endpoint URL, e.g. `https://<project>.supabase.co`.
    pub url: String,

    /// Publishable access key sent with every request.
    pub key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            key: key.into(),
        }
    }

    /// Returns true when these are the built-in values.
    pub fn is_default(&self) -> bool {
        self.url == DEFAULT_REMOTE_URL && self.key == DEFAULT_REMOTE_KEY
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig::new(DEFAULT_REMOTE_URL, DEFAULT_REMOTE_KEY)
    }
}

// =============================================================================
// Collection Name
// =============================================================================

/// A validated collection name.
///
/// The same name is used for the remote table and, behind the namespace
/// prefix, for the local mirror key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validates and wraps a collection name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_collection_name(&name)?;
        Ok(CollectionName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CollectionName::new(value)
    }
}

impl<'de> Deserialize<'de> for CollectionName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CollectionName::new(raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Record
// =============================================================================

/// A typed collection record.
///
/// Implementors serialize to a JSON object whose `id` field matches
/// [`Record::record_id`].
///
/// ## Example
/// ```rust
/// use nabil_core::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Product {
///     id: String,
///     name: String,
/// }
///
/// impl Record for Product {
///     fn record_id(&self) -> String {
///         self.id.clone()
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    fn record_id(&self) -> String;
}

// =============================================================================
// Unit Tests
// =============================================================================
