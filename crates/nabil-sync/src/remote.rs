//! # Remote Service Seams
//!
//! Traits describing the hosted backend, so the data access layer can run
//! against the real REST client or an in-process fake.
//!
//! ## Remote Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hosted Backend                                   │
//! │                                                                         │
//! │  RemoteTables                         RemoteAuth                        │
//! │  ─────────────                        ──────────                        │
//! │  select_all(table, order)             sign_in_with_password            │
//! │  select_field(table, col, key, f)     sign_up                          │
//! │  upsert(table, row)                   oauth_redirect(provider, to)     │
//! │  delete_eq(table, col, value)         sign_out                         │
//! │                                                                         │
//! │  Implemented by:                                                       │
//! │  • RestClient (rest.rs) - PostgREST + GoTrue over HTTPS                │
//! │  • test fakes                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use nabil_core::{AuthTokens, User, ID_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::SyncResult;

// =============================================================================
// Ordering
// =============================================================================

/// Sort direction for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Column ordering for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        OrderBy {
            column: column.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        OrderBy {
            column: column.into(),
            order: SortOrder::Descending,
        }
    }

    /// Newest-first by record id, the order every collection is fetched in.
    pub fn id_desc() -> Self {
        OrderBy::desc(ID_FIELD)
    }

    /// PostgREST `order` parameter value, e.g. `id.desc`.
    pub fn to_param(&self) -> String {
        let dir = match self.order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        format!("{}.{}", self.column, dir)
    }
}

// =============================================================================
// Auth Types
// =============================================================================

/// OAuth identity providers the sign-in panel offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Github,
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthProvider::Github => write!(f, "github"),
        }
    }
}

/// Where to send the user to continue an OAuth sign-in.
///
/// The session only exists once the provider redirects back; this layer's
/// part ends here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub provider: OAuthProvider,
    pub url: String,
}

/// A signed-in user plus the tokens that authorize their requests.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user: User,
    pub tokens: AuthTokens,
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account needs email confirmation before it can sign in.
    ConfirmationSent { email: String },

    /// The service signed the new user in straight away.
    SignedIn(User),
}

// =============================================================================
// Traits
// =============================================================================

/// Row-level access to the hosted tables.
#[async_trait]
pub trait RemoteTables: Send + Sync {
    /// Selects every visible row of `table`.
    async fn select_all(&self, table: &str, order: &OrderBy) -> SyncResult<Vec<Value>>;

    /// Selects one field of the row where `key_column = key`.
    ///
    /// `Ok(None)` when no row matches.
    async fn select_field(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        field: &str,
    ) -> SyncResult<Option<Value>>;

    /// Inserts the row, or merges it into the row with the same primary key.
    async fn upsert(&self, table: &str, row: &Value) -> SyncResult<()>;

    /// Deletes rows where `column = value`.
    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> SyncResult<()>;
}

/// The hosted authentication service.
#[async_trait]
pub trait RemoteAuth: Send + Sync {
    /// Signs in and starts sending the new access token.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> SyncResult<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str) -> SyncResult<SignUpOutcome>;

    /// Builds the provider redirect for an OAuth sign-in.
    async fn oauth_redirect(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> SyncResult<OAuthRedirect>;

    /// Ends the remote session.
    async fn sign_out(&self) -> SyncResult<()>;

    /// Installs tokens saved by an earlier sign-in, or drops the current
    /// ones with `None`. Makes no network call.
    async fn restore_session(&self, tokens: Option<AuthTokens>);
}

pub type SharedTables = Arc<dyn RemoteTables>;
pub type SharedAuth = Arc<dyn RemoteAuth>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_param() {
        assert_eq!(OrderBy::id_desc().to_param(), "id.desc");
        assert_eq!(OrderBy::asc("name").to_param(), "name.asc");
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(OAuthProvider::Github.to_string(), "github");
    }
}
