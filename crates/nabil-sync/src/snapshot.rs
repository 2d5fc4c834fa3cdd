//! # Snapshots
//!
//! JSON backups of several collections, used by the panel's export and
//! import actions.
//!
//! ## Format
//! ```json
//! {
//!   "exported_at": "2026-10-16T09:30:00Z",
//!   "collections": {
//!     "categories": [{"id": "c1", "name": "Drinks"}],
//!     "products":   [{"id": "p1", "name": "Tea", "category_id": "c1"}]
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use nabil_core::mirror::require_record_id;
use nabil_core::CollectionName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::access::DataAccess;
use crate::error::{SyncError, SyncResult};

/// A point-in-time copy of several collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub collections: BTreeMap<CollectionName, Vec<Value>>,
}

impl Snapshot {
    /// Parses a snapshot document.
    pub fn from_json(raw: &str) -> SyncResult<Self> {
        serde_json::from_str(raw).map_err(|e| SyncError::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> SyncResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn record_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Checks every record has an id, so an import fails before writing
    /// anything.
    pub fn validate(&self) -> SyncResult<()> {
        for (name, rows) in &self.collections {
            for row in rows {
                require_record_id(name.as_str(), row)
                    .map_err(|e| SyncError::InvalidSnapshot(e.to_string()))?;
            }
        }
        Ok(())
    }
}

impl DataAccess {
    /// Copies the current view of each named collection.
    pub async fn export_snapshot(&self, collections: &[&str]) -> SyncResult<Snapshot> {
        let mut snapshot = Snapshot {
            exported_at: Utc::now(),
            collections: BTreeMap::new(),
        };
        for collection in collections {
            let name = CollectionName::new(*collection)?;
            let rows = self.get_all(name.as_str()).await?;
            snapshot.collections.insert(name, rows);
        }

        info!(
            collections = snapshot.collections.len(),
            records = snapshot.record_count(),
            "Snapshot exported"
        );
        Ok(snapshot)
    }

    /// Saves every record of a snapshot through `save_item`.
    ///
    /// Returns the number of records written per collection.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> SyncResult<BTreeMap<String, usize>> {
        snapshot.validate()?;

        let mut written = BTreeMap::new();
        for (name, rows) in &snapshot.collections {
            for row in rows {
                self.save_item(name.as_str(), row.clone()).await?;
            }
            written.insert(name.to_string(), rows.len());
        }

        info!(
            exported_at = %snapshot.exported_at,
            records = snapshot.record_count(),
            "Snapshot imported"
        );
        Ok(written)
    }
}
