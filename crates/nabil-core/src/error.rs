//! # Error Types
//!
//! Domain-specific error types for nabil-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  nabil-core errors (this file)                                         │
//! │  ├── CoreError        - Record and value shape problems                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  nabil-db errors (separate crate)                                      │
//! │  └── StoreError       - Local storage failures                         │
//! │                                                                         │
//! │  nabil-sync errors (separate crate)                                    │
//! │  └── SyncError        - What callers of the data layer see             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → UI notice              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while interpreting records and scalar values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record has no usable `id` field.
    ///
    /// ## When This Occurs
    /// - The `id` key is absent
    /// - The `id` is null, a boolean, an object, or an empty string
    #[error("Record in {collection} has no usable id")]
    MissingRecordId { collection: String },

    /// A record is not a JSON object.
    #[error("Record in {collection} must be a JSON object")]
    NotAnObject { collection: String },

    /// A decimal amount could not be parsed into money.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::MissingRecordId {
            collection: "products".to_string(),
        };
        assert_eq!(err.to_string(), "Record in products has no usable id");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "collection".to_string(),
        };
        assert_eq!(err.to_string(), "collection is required");

        let err = ValidationError::TooLong {
            field: "collection".to_string(),
            max: 63,
        };
        assert_eq!(err.to_string(), "collection must be at most 63 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
