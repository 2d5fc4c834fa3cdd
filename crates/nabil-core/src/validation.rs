//! # Validation Module
//!
//! Input validation for values that end up in storage keys, table paths, or
//! auth requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI form (TypeScript)                                         │
//! │  └── Required inputs, input types                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Collection names safe for keys and URL paths                      │
//! │  └── Credentials present before a network round-trip                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote service (row policies, auth rules)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::keys::RESERVED_KEYS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest collection name accepted (PostgreSQL identifier limit).
pub const MAX_COLLECTION_NAME_LEN: usize = 63;

/// Validates a collection (table) name.
///
/// ## Rules
/// - Must not be empty
/// - At most 63 characters
/// - ASCII letters, digits, and underscores only, not starting with a digit
/// - Not one of the fixed storage keys (`CURRENT_USER`, `TOTAL_EARNINGS`, ...)
///
/// ## Example
/// ```rust
/// use nabil_core::validation::validate_collection_name;
///
/// assert!(validate_collection_name("products").is_ok());
/// assert!(validate_collection_name("").is_err());
/// assert!(validate_collection_name("a/b").is_err());
/// ```
pub fn validate_collection_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "collection".to_string(),
        });
    }

    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "collection".to_string(),
            max: MAX_COLLECTION_NAME_LEN,
        });
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "collection".to_string(),
            reason: "must not start with a digit".to_string(),
        });
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "collection".to_string(),
            reason: "only letters, digits, and underscores are allowed".to_string(),
        });
    }

    if RESERVED_KEYS.contains(&name) {
        return Err(ValidationError::InvalidFormat {
            field: "collection".to_string(),
            reason: format!("'{}' is a reserved storage key", name),
        });
    }

    Ok(())
}

/// Validates the email/password pair before it is sent to the auth service.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "missing '@'".to_string(),
        });
    }
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}
