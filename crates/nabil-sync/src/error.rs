//! # Data Access Error Types
//!
//! Error types for the data access layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Data Access Error Categories                        │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │      Remote Auth        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  AuthFailed             │ │
//! │  │  ConfigLoad     │  │  Remote{status} │  │  OAuthFailed            │ │
//! │  │  ConfigSave     │  │  Timeout        │  │  NotSignedIn            │ │
//! │  │  InvalidUrl     │  │  Deserialization│  │                         │ │
//! │  │                 │  │  MissingAccess..│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Local Storage  │  │   Validation    │                              │
//! │  │                 │  │                 │                              │
//! │  │  Local(Store..) │  │  Invalid(Core..)│                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Degradation Rules
//! Remote errors (`is_remote()`) never escape `get_all`, `save_item`,
//! `delete_item`, or the earnings accessors: reads serve the local mirror
//! and writes fall back to local-only. Auth errors always reach the caller.

use nabil_core::{CoreError, ValidationError};
use nabil_db::StoreError;
use thiserror::Error;

/// Result type alias for data access operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Data access error covering every failure a caller can observe.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote endpoint URL could not be used to build a request.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Failed to load the settings file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the settings file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Could not reach the remote service.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Remote request timed out.
    #[error("Remote request timed out")]
    Timeout,

    /// Remote service answered with an error status.
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Remote response body was not the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A table request was about to go out without the user's bearer token.
    #[error("No access token for the remote session")]
    MissingAccessToken,

    // =========================================================================
    // Auth Errors
    // =========================================================================
    /// Password sign-in or sign-up was rejected.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// OAuth sign-in could not be started.
    #[error("OAuth sign-in failed: {0}")]
    OAuthFailed(String),

    /// The operation needs a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    // =========================================================================
    // Local and Input Errors
    // =========================================================================
    /// Local storage failed.
    #[error("Local storage error: {0}")]
    Local(#[from] StoreError),

    /// Input rejected before any I/O.
    #[error("Invalid input: {0}")]
    Invalid(#[from] CoreError),

    /// Snapshot could not be imported.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for SyncError {
    fn from(err: ValidationError) -> Self {
        SyncError::Invalid(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Timeout
        } else if err.is_decode() {
            SyncError::DeserializationFailed(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SyncError::Connection(err.to_string())
        }
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::DeserializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true for failures of the remote data service.
    ///
    /// These are the errors the remote-then-local policy absorbs.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Connection(_)
                | SyncError::Timeout
                | SyncError::Remote { .. }
                | SyncError::DeserializationFailed(_)
                | SyncError::MissingAccessToken
                | SyncError::InvalidUrl(_)
        )
    }

    /// Returns true for sign-in, sign-up, and OAuth failures.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SyncError::AuthFailed(_) | SyncError::OAuthFailed(_) | SyncError::NotSignedIn
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}
