//! In-process fakes for the remote seams, plus ready-made fixtures.

use async_trait::async_trait;
use nabil_core::mirror::record_id;
use nabil_core::{AuthTokens, User};
use nabil_db::{LocalStorage, MemoryStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::access::DataAccess;
use crate::error::{SyncError, SyncResult};
use crate::remote::{
    AuthSession, OAuthProvider, OAuthRedirect, OrderBy, RemoteAuth, RemoteTables, SignUpOutcome,
    SortOrder,
};
use crate::remote_config::ReloadSignal;
use crate::session::SessionManager;

pub(crate) const TEST_ORIGIN: &str = "http://localhost:5173";
pub(crate) const TEST_USER_ID: &str = "user-1";

#[derive(Default)]
struct FakeState {
    tables: HashMap<String, Vec<Value>>,
    accounts: HashMap<String, String>,
    upserts: Vec<(String, Value)>,
    offline: bool,
    oauth_disabled: bool,
    latency: Option<Duration>,
    token: Option<String>,
    require_token: bool,
    calls: usize,
    sign_outs: usize,
}

/// Hosted backend held in memory.
#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn set_oauth_disabled(&self, disabled: bool) {
        self.state.lock().unwrap().oauth_disabled = disabled;
    }

    /// Makes table calls fail without a bearer token, as the REST client
    /// does.
    pub fn set_require_token(&self, require: bool) {
        self.state.lock().unwrap().require_token = require;
    }

    /// The bearer token currently installed.
    pub fn token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = Some(latency);
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(email.to_string(), password.to_string());
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn upserts(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().upserts.clone()
    }

    /// Remote calls made so far, successful or not.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn sign_outs(&self) -> usize {
        self.state.lock().unwrap().sign_outs
    }

    /// Counts the call, waits out any latency, and fails when offline.
    async fn enter(&self) -> SyncResult<()> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.state.lock().unwrap().offline {
            return Err(SyncError::Connection("connection refused".into()));
        }
        Ok(())
    }

    async fn enter_table(&self) -> SyncResult<()> {
        self.enter().await?;
        let state = self.state.lock().unwrap();
        if state.require_token && state.token.is_none() {
            return Err(SyncError::MissingAccessToken);
        }
        Ok(())
    }
}

fn matches_column(row: &Value, column: &str, value: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.to_string() == value,
        _ => false,
    }
}

#[async_trait]
impl RemoteTables for FakeRemote {
    async fn select_all(&self, table: &str, order: &OrderBy) -> SyncResult<Vec<Value>> {
        self.enter_table().await?;
        let mut rows = self.rows(table);
        rows.sort_by_key(|row| row.get(&order.column).map(|v| v.to_string()));
        if order.order == SortOrder::Descending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn select_field(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        field: &str,
    ) -> SyncResult<Option<Value>> {
        self.enter_table().await?;
        Ok(self
            .rows(table)
            .into_iter()
            .find(|row| matches_column(row, key_column, key))
            .and_then(|row| row.get(field).cloned()))
    }

    async fn upsert(&self, table: &str, row: &Value) -> SyncResult<()> {
        self.enter_table().await?;
        let mut state = self.state.lock().unwrap();
        state.upserts.push((table.to_string(), row.clone()));

        let id = record_id(row);
        let rows = state.tables.entry(table.to_string()).or_default();
        rows.retain(|existing| record_id(existing) != id);
        rows.push(row.clone());
        Ok(())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> SyncResult<()> {
        self.enter_table().await?;
        if let Some(rows) = self.state.lock().unwrap().tables.get_mut(table) {
            rows.retain(|row| !matches_column(row, column, value));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteAuth for FakeRemote {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> SyncResult<AuthSession> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        if state.accounts.get(email).map(String::as_str) != Some(password) {
            return Err(SyncError::AuthFailed("Invalid login credentials".into()));
        }
        let tokens = AuthTokens::new(format!("token-{}", email));
        state.token = Some(tokens.access_token.clone());
        Ok(AuthSession {
            user: User::new(format!("id-{}", email)).with_email(email),
            tokens,
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> SyncResult<SignUpOutcome> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(email) {
            return Err(SyncError::AuthFailed("User already registered".into()));
        }
        state
            .accounts
            .insert(email.to_string(), password.to_string());
        Ok(SignUpOutcome::ConfirmationSent {
            email: email.to_string(),
        })
    }

    async fn oauth_redirect(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> SyncResult<OAuthRedirect> {
        if self.state.lock().unwrap().oauth_disabled {
            return Err(SyncError::OAuthFailed(
                "Unsupported provider: provider is not enabled".into(),
            ));
        }
        Ok(OAuthRedirect {
            provider,
            url: format!(
                "https://fake.supabase.co/auth/v1/authorize?provider={}&redirect_to={}",
                provider, redirect_to
            ),
        })
    }

    async fn sign_out(&self) -> SyncResult<()> {
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        state.sign_outs += 1;
        state.token = None;
        Ok(())
    }

    async fn restore_session(&self, tokens: Option<AuthTokens>) {
        self.state.lock().unwrap().token = tokens.map(|t| t.access_token);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Routes `tracing` output through the test harness. `RUST_LOG` filters it.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) struct Fixture {
    pub store: MemoryStore,
    pub remote: Arc<FakeRemote>,
    pub reload: ReloadSignal,
    pub access: DataAccess,
    pub session: SessionManager,
}

/// A context over an empty store with no session.
pub(crate) fn fixture() -> Fixture {
    fixture_with(Arc::new(FakeRemote::new()))
}

pub(crate) fn fixture_with(remote: Arc<FakeRemote>) -> Fixture {
    init_tracing();
    let store = MemoryStore::new();
    let reload = ReloadSignal::new();
    let access = DataAccess::new(
        LocalStorage::from_store(store.clone()),
        remote.clone(),
        remote.clone(),
        TEST_ORIGIN,
        Arc::new(reload.clone()),
    );
    let session = access.session().clone();
    Fixture {
        store,
        remote,
        reload,
        access,
        session,
    }
}

/// Like [`fixture`], with `user-1` signed in.
pub(crate) async fn signed_in_fixture() -> Fixture {
    let fx = fixture();
    sign_in(&fx).await;
    fx
}

pub(crate) async fn sign_in(fx: &Fixture) {
    let session = AuthSession {
        user: User::new(TEST_USER_ID),
        tokens: AuthTokens::new("token-user-1"),
    };
    fx.session.save_session(&session).await.unwrap();
}
