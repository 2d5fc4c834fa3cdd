//! # Mirror Arithmetic
//!
//! Pure functions that recompute a collection mirror after a write.
//!
//! ## Write Recomputation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Mirror After save_item(item)                         │
//! │                                                                         │
//! │  freshest view (remote rows, or local mirror when offline)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  drop every row whose id == item.id       ← remove_record              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  append item                              ← upsert_record              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  persisted as the new mirror                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids arrive as strings or numbers depending on the table schema. Both are
//! compared through their canonical string form, so `7` and `"7"` name the
//! same record.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::{ID_FIELD, OWNER_FIELD};

/// Extracts the canonical id of a record.
///
/// Returns `None` for missing, null, empty, or non-scalar ids.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`record_id`], but reports which collection the bad record was for.
pub fn require_record_id(collection: &str, record: &Value) -> CoreResult<String> {
    if !record.is_object() {
        return Err(CoreError::NotAnObject {
            collection: collection.to_string(),
        });
    }
    record_id(record).ok_or_else(|| CoreError::MissingRecordId {
        collection: collection.to_string(),
    })
}

/// Removes every record with the given id.
pub fn remove_record(rows: Vec<Value>, id: &str) -> Vec<Value> {
    rows.into_iter()
        .filter(|row| record_id(row).as_deref() != Some(id))
        .collect()
}

/// Replaces any record sharing the item's id and appends the item.
///
/// The item goes to the end, so a replaced record changes position.
pub fn upsert_record(rows: Vec<Value>, item: Value) -> CoreResult<Vec<Value>> {
    let id = record_id(&item).ok_or_else(|| CoreError::MissingRecordId {
        collection: "mirror".to_string(),
    })?;
    let mut rows = remove_record(rows, &id);
    rows.push(item);
    Ok(rows)
}

/// Returns a copy of the record with the owner field set.
///
/// Non-object values are returned unchanged.
pub fn with_owner(record: &Value, owner_id: &str) -> Value {
    let mut row = record.clone();
    if let Value::Object(map) = &mut row {
        map.insert(OWNER_FIELD.to_string(), Value::String(owner_id.to_string()));
    }
    row
}
