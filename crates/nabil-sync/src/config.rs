//! # Client Settings
//!
//! Host-level settings for the data access layer: where the local database
//! lives, which key namespace it owns, and how remote calls behave.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NABIL_DATABASE_PATH=/data/nabil.db                                 │
//! │     NABIL_APP_ORIGIN=https://inventory.example.com                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/inventory/client.toml (Linux)                            │
//! │     ~/Library/Application Support/com.nabil.inventory/client.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │                                                                         │
//! │  The remote URL and key are NOT here: they live in the local store     │
//! │  so the sign-in panel can change them (see remote_config.rs).          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [storage]
//! database_path = "/var/lib/nabil/nabil.db"
//! namespace_prefix = "NabilInventory_"
//!
//! [remote]
//! app_origin = "http://localhost:5173"
//! request_timeout_secs = 15
//! ```

use nabil_core::{StorageKey, DB_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

const CONFIG_FILE_NAME: &str = "client.toml";
const DATABASE_FILE_NAME: &str = "nabil.db";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where and how local data is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file. `None` resolves to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Prefix on every key this layer owns.
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,
}

fn default_namespace_prefix() -> String {
    DB_PREFIX.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            namespace_prefix: default_namespace_prefix(),
        }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Behaviour of calls to the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Origin the OAuth provider redirects back to.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_app_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            app_origin: default_app_origin(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Main Client Settings
// =============================================================================

/// Complete client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub remote: RemoteSettings,
}

impl ClientSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client settings from file");
                let contents = std::fs::read_to_string(&path)?;
                settings = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves settings to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client settings saved");
        Ok(())
    }

    /// Validates the settings.
    pub fn validate(&self) -> SyncResult<()> {
        if self.storage.namespace_prefix.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "namespace_prefix must not be empty".into(),
            ));
        }

        let origin = &self.remote.app_origin;
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(SyncError::InvalidUrl(format!(
                "App origin must start with http:// or https://, got: {}",
                origin
            )));
        }

        if self.remote.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `NABIL_*` overrides from any variable source.
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("NABIL_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(prefix) = var("NABIL_NAMESPACE_PREFIX") {
            self.storage.namespace_prefix = prefix;
        }

        if let Some(origin) = var("NABIL_APP_ORIGIN") {
            debug!(origin = %origin, "Overriding app origin from environment");
            self.remote.app_origin = origin;
        }

        if let Some(timeout) = var("NABIL_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.remote.request_timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric request timeout"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "nabil", "inventory")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database path: configured path, else the platform data dir.
    pub fn database_path(&self) -> SyncResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .ok_or_else(|| SyncError::InvalidConfig("No data directory available".into()))
    }

    pub fn storage_key(&self) -> StorageKey {
        StorageKey::new(self.storage.namespace_prefix.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs)
    }

    pub fn app_origin(&self) -> &str {
        &self.remote.app_origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.storage.namespace_prefix, "NabilInventory_");
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut settings = ClientSettings::default();

        settings.storage.namespace_prefix = "  ".into();
        assert!(settings.validate().unwrap_err().is_config_error());

        settings.storage.namespace_prefix = "Shop_".into();
        settings.remote.app_origin = "localhost:5173".into();
        assert!(matches!(
            settings.validate(),
            Err(SyncError::InvalidUrl(_))
        ));

        settings.remote.app_origin = "https://shop.example.com".into();
        settings.remote.request_timeout_secs = 0;
        assert!(settings.validate().is_err());

        settings.remote.request_timeout_secs = 5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = ClientSettings::default();
        settings.storage.database_path = Some(PathBuf::from("/tmp/nabil.db"));
        settings.remote.app_origin = "https://shop.example.com".into();

        let toml_str = toml::to_string_pretty(&settings).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[remote]"));

        let parsed: ClientSettings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: ClientSettings = toml::from_str("[remote]\nrequest_timeout_secs = 3\n").unwrap();
        assert_eq!(parsed.remote.request_timeout_secs, 3);
        assert_eq!(parsed.remote.app_origin, "http://localhost:5173");
        assert_eq!(parsed.storage, StorageSettings::default());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NABIL_DATABASE_PATH", "/data/inv.db"),
            ("NABIL_APP_ORIGIN", "https://inv.example.com"),
            ("NABIL_REQUEST_TIMEOUT_SECS", "nope"),
        ]
        .into_iter()
        .collect();

        let mut settings = ClientSettings::default();
        settings.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(
            settings.database_path().unwrap(),
            PathBuf::from("/data/inv.db")
        );
        assert_eq!(settings.app_origin(), "https://inv.example.com");
        // Unparseable numbers leave the previous value.
        assert_eq!(settings.remote.request_timeout_secs, 15);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("nabil-settings-{}", std::process::id()))
            .join("client.toml");

        let mut settings = ClientSettings::default();
        settings.storage.namespace_prefix = "Test_".into();
        settings.save(Some(path.clone())).unwrap();

        let loaded = ClientSettings::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.storage.namespace_prefix, "Test_");
        assert_eq!(loaded.storage_key().prefix(), "Test_");

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
