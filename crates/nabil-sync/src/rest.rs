//! # REST Client
//!
//! HTTPS client for the hosted backend: PostgREST-style table endpoints and
//! the GoTrue-style auth endpoints.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hosted Backend Endpoints                         │
//! │                                                                         │
//! │  Tables   {url}/rest/v1/{table}                                        │
//! │  ───────                                                               │
//! │  GET     ?select=*&order=id.desc          select_all                   │
//! │  GET     ?select={field}&{col}=eq.{key}   select_field                 │
//! │  POST    Prefer: resolution=merge-...     upsert                       │
//! │  DELETE  ?{col}=eq.{value}                delete_eq                    │
//! │                                                                         │
//! │  Auth     {url}/auth/v1/...                                            │
//! │  ─────                                                                 │
//! │  POST    token?grant_type=password        sign_in_with_password        │
//! │  POST    signup                           sign_up                      │
//! │  (none)  authorize?provider=..&redirect_to=..   oauth_redirect         │
//! │  POST    logout                           sign_out                     │
//! │                                                                         │
//! │  Every request carries `apikey: {key}` and                             │
//! │  `Authorization: Bearer {access token, else key}`.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Handling
//! Sign-in installs the user's access token; the session layer persists it
//! and hands it back through `restore_session` when a context is rebuilt.
//! Table requests never go out under the bare public key: row-level
//! security answers those with an empty result rather than an error, which
//! would read as "the collection is empty". Without a token they fail with
//! `SyncError::MissingAccessToken` and the caller serves its local mirror.

use async_trait::async_trait;
use nabil_core::{AuthTokens, RemoteConfig, User};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::remote::{
    AuthSession, OAuthProvider, OAuthRedirect, OrderBy, RemoteAuth, RemoteTables, SignUpOutcome,
};

const REST_PATH: &str = "rest/v1";
const AUTH_PATH: &str = "auth/v1";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Token response of the password grant and of auto-confirmed sign-ups.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user,
            tokens: AuthTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
            },
        }
    }
}

/// Client for one remote endpoint and key.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestClient {
    /// Creates a client.
    ///
    /// The URL is not checked here; a malformed URL surfaces as
    /// `SyncError::InvalidUrl` on the first request, which the data access
    /// policy treats like any other remote failure.
    pub fn new(config: &RemoteConfig, timeout: Duration) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Connection(e.to_string()))?;

        debug!(url = %config.url, "REST client created");
        Ok(RestClient {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installs (or clears) the bearer token sent with every request.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    async fn require_token(&self) -> SyncResult<()> {
        if self.has_access_token().await {
            Ok(())
        } else {
            Err(SyncError::MissingAccessToken)
        }
    }

    // =========================================================================
    // URL Building
    // =========================================================================

    fn endpoint(&self, service: &str, path: &str) -> SyncResult<Url> {
        Ok(Url::parse(&format!("{}/{}/{}", self.base_url, service, path))?)
    }

    /// `{url}/rest/v1/{table}` with the given query pairs.
    pub fn table_url(&self, table: &str, query: &[(&str, &str)]) -> SyncResult<Url> {
        let mut url = self.endpoint(REST_PATH, table)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// `{url}/auth/v1/{path}` with the given query pairs.
    pub fn auth_url(&self, path: &str, query: &[(&str, &str)]) -> SyncResult<Url> {
        let mut url = self.endpoint(AUTH_PATH, path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// The provider authorize URL the user is sent to.
    pub fn authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> SyncResult<Url> {
        let provider = provider.to_string();
        self.auth_url(
            "authorize",
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
    }

    // =========================================================================
    // Request Helpers
    // =========================================================================

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .access_token
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.key.clone());
        request
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, request: RequestBuilder) -> SyncResult<Response> {
        let response = self.authorized(request).await.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Remote {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    /// Sends an auth request, mapping rejections to `AuthFailed`.
    async fn send_auth(&self, request: RequestBuilder) -> SyncResult<Response> {
        self.send(request).await.map_err(|e| match e {
            SyncError::Remote { message, .. } => SyncError::AuthFailed(message),
            other => other,
        })
    }
}

/// Pulls a readable message out of an error body.
///
/// The table API answers `{"message": ..}`, the auth API `{"msg": ..}` or
/// `{"error_description": ..}`.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["message", "msg", "error_description", "error"] {
            if let Some(text) = value.get(field).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response".to_string()
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// Tables
// =============================================================================

#[async_trait]
impl RemoteTables for RestClient {
    async fn select_all(&self, table: &str, order: &OrderBy) -> SyncResult<Vec<Value>> {
        self.require_token().await?;
        let order = order.to_param();
        let url = self.table_url(table, &[("select", "*"), ("order", order.as_str())])?;
        let response = self.send(self.http.get(url)).await?;
        let rows: Vec<Value> = response.json().await?;
        debug!(table, rows = rows.len(), "Remote select");
        Ok(rows)
    }

    async fn select_field(
        &self,
        table: &str,
        key_column: &str,
        key: &str,
        field: &str,
    ) -> SyncResult<Option<Value>> {
        self.require_token().await?;
        let filter = format!("eq.{}", key);
        let url = self.table_url(
            table,
            &[("select", field), (key_column, filter.as_str()), ("limit", "1")],
        )?;
        let response = self.send(self.http.get(url)).await?;
        let rows: Vec<Value> = response.json().await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get(field).cloned()))
    }

    async fn upsert(&self, table: &str, row: &Value) -> SyncResult<()> {
        self.require_token().await?;
        let url = self.table_url(table, &[])?;
        let request = self.http.post(url).header("Prefer", UPSERT_PREFER).json(row);
        self.send(request).await?;
        debug!(table, "Remote upsert");
        Ok(())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> SyncResult<()> {
        self.require_token().await?;
        let filter = format!("eq.{}", value);
        let url = self.table_url(table, &[(column, filter.as_str())])?;
        self.send(self.http.delete(url)).await?;
        debug!(table, column, value, "Remote delete");
        Ok(())
    }
}

// =============================================================================
// Auth
// =============================================================================

#[async_trait]
impl RemoteAuth for RestClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> SyncResult<AuthSession> {
        let url = self.auth_url("token", &[("grant_type", "password")])?;
        let request = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }));
        let response = self.send_auth(request).await?;
        let session = response.json::<TokenResponse>().await?.into_session();

        self.set_access_token(Some(session.tokens.access_token.clone()))
            .await;
        info!(user_id = %session.user.id, "Signed in with password");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> SyncResult<SignUpOutcome> {
        let url = self.auth_url("signup", &[])?;
        let request = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self.send_auth(request).await?.json().await?;

        // Auto-confirmed projects answer with a session, others with the
        // pending user. The session is not installed; the user signs in.
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            info!(user_id = %token.user.id, "Signed up with immediate session");
            return Ok(SignUpOutcome::SignedIn(token.user));
        }

        info!("Sign-up pending email confirmation");
        Ok(SignUpOutcome::ConfirmationSent {
            email: email.to_string(),
        })
    }

    async fn oauth_redirect(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> SyncResult<OAuthRedirect> {
        let url = self
            .authorize_url(provider, redirect_to)
            .map_err(|e| SyncError::OAuthFailed(e.to_string()))?;
        Ok(OAuthRedirect {
            provider,
            url: url.into(),
        })
    }

    async fn sign_out(&self) -> SyncResult<()> {
        if !self.has_access_token().await {
            return Ok(());
        }

        let url = self.auth_url("logout", &[])?;
        let result = self.send(self.http.post(url)).await;

        // The local token is dropped whatever the server says.
        self.set_access_token(None).await;
        if let Err(ref e) = result {
            warn!(?e, "Remote sign-out failed");
        }
        result.map(|_| ())
    }

    async fn restore_session(&self, tokens: Option<AuthTokens>) {
        self.set_access_token(tokens.map(|t| t.access_token)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> RestClient {
        RestClient::new(&RemoteConfig::new(url, "anon-key"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_table_url() {
        let client = client("https://abc.supabase.co/");
        let url = client
            .table_url("products", &[("select", "*"), ("order", "id.desc")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/products?select=*&order=id.desc"
        );
    }

    #[test]
    fn test_filter_url() {
        let client = client("https://abc.supabase.co");
        let url = client.table_url("sales", &[("id", "eq.42")]).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/sales?id=eq.42");
    }

    #[test]
    fn test_authorize_url() {
        let client = client("https://abc.supabase.co");
        let url = client
            .authorize_url(OAuthProvider::Github, "http://localhost:5173")
            .unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("provider".to_string(), "github".to_string()),
                ("redirect_to".to_string(), "http://localhost:5173".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_url_is_remote_error() {
        let client = client("not a url");
        let err = client.table_url("products", &[]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
        assert!(err.is_remote());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"code":"42P01","message":"relation does not exist"}"#),
            "relation does not exist"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(""), "empty response");
    }

    #[tokio::test]
    async fn test_oauth_redirect_needs_no_network() {
        let client = client("https://abc.supabase.co");
        let redirect = client
            .oauth_redirect(OAuthProvider::Github, "https://shop.example.com")
            .await
            .unwrap();
        assert_eq!(redirect.provider, OAuthProvider::Github);
        assert!(redirect.url.starts_with("https://abc.supabase.co/auth/v1/authorize?"));
    }

    #[tokio::test]
    async fn test_tables_refuse_requests_without_token() {
        let client = client("https://abc.supabase.co");
        let err = client
            .select_all("products", &OrderBy::id_desc())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingAccessToken));
        assert!(err.is_remote());

        let err = client
            .upsert("products", &json!({"id": "p1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::MissingAccessToken));
    }

    #[tokio::test]
    async fn test_restore_session_installs_token() {
        let client = client("https://abc.supabase.co");
        client
            .restore_session(Some(AuthTokens::new("user-jwt")))
            .await;
        assert!(client.has_access_token().await);

        client.restore_session(None).await;
        assert!(!client.has_access_token().await);
    }

    #[test]
    fn test_token_response_keeps_refresh_token() {
        let body = json!({
            "access_token": "jwt",
            "refresh_token": "refresh",
            "user": {"id": "u-1"}
        });
        let session = serde_json::from_value::<TokenResponse>(body)
            .unwrap()
            .into_session();
        assert_eq!(session.user, User::new("u-1"));
        assert_eq!(
            session.tokens,
            AuthTokens::new("jwt").with_refresh_token("refresh")
        );
    }

    #[tokio::test]
    async fn test_sign_out_without_token_is_noop() {
        let client = client("https://abc.supabase.co");
        assert!(!client.has_access_token().await);
        client.sign_out().await.unwrap();

        client.set_access_token(Some("jwt".into())).await;
        assert!(client.has_access_token().await);
    }
}
