//! # Session Management
//!
//! The locally cached "who is signed in" record, the bearer tokens stored
//! beside it, and the remote auth calls that create and end them.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Session Lifecycle                              │
//! │                                                                         │
//! │   (none) ──sign_in_with_password──► CURRENT_USER + AUTH_TOKENS saved   │
//! │      │                                    │                             │
//! │      │  sign_in_with_github               │ logout                     │
//! │      │  (redirect only; the host calls    │  1. remote sign-out        │
//! │      │   save_session when it comes back) │     (best-effort)          │
//! │      ▼                                    │  2. clear EVERY local key  │
//! │   OAuthRedirect                           ▼                             │
//! │                                        (none)                          │
//! │                                                                         │
//! │   new context ──restore──► stored tokens handed to the remote client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use nabil_core::validation::validate_credentials;
use nabil_core::User;
use nabil_db::LocalStorage;
use tracing::{debug, info, warn};

use crate::error::SyncResult;
use crate::remote::{AuthSession, OAuthProvider, OAuthRedirect, SharedAuth, SignUpOutcome};

/// Owns the session record.
#[derive(Clone)]
pub struct SessionManager {
    local: LocalStorage,
    auth: SharedAuth,
    app_origin: String,
}

impl SessionManager {
    pub fn new(local: LocalStorage, auth: SharedAuth, app_origin: impl Into<String>) -> Self {
        SessionManager {
            local,
            auth,
            app_origin: app_origin.into(),
        }
    }

    /// The signed-in user, if any.
    pub async fn get_user(&self) -> SyncResult<Option<User>> {
        Ok(self.local.session().load().await?)
    }

    /// Stores `user` as the session record, replacing any previous one.
    pub async fn save_user(&self, user: &User) -> SyncResult<()> {
        self.local.session().save(user).await?;
        info!(user_id = %user.id, "Session saved");
        Ok(())
    }

    /// Records a remote session: tokens first, then the user record, then
    /// the tokens go to the remote client.
    ///
    /// This is how the host completes a GitHub sign-in.
    pub async fn save_session(&self, session: &AuthSession) -> SyncResult<()> {
        self.local.session().save_tokens(&session.tokens).await?;
        self.save_user(&session.user).await?;
        self.auth.restore_session(Some(session.tokens.clone())).await;
        Ok(())
    }

    /// Hands stored tokens to the remote client.
    ///
    /// Returns false when there is no session record or no tokens; remote
    /// table calls then fail and reads stay on the local mirror.
    pub async fn restore(&self) -> SyncResult<bool> {
        if self.get_user().await?.is_none() {
            return Ok(false);
        }
        match self.local.session().load_tokens().await? {
            Some(tokens) => {
                self.auth.restore_session(Some(tokens)).await;
                debug!("Remote session restored");
                Ok(true)
            }
            None => {
                warn!("Session record has no tokens, remote calls will be skipped");
                Ok(false)
            }
        }
    }

    /// Signs out remotely, then wipes the whole local store.
    ///
    /// A failed remote sign-out is logged and does not stop the wipe.
    pub async fn logout(&self) -> SyncResult<()> {
        if let Err(e) = self.auth.sign_out().await {
            warn!(?e, "Remote sign-out failed, clearing local data anyway");
        }
        self.auth.restore_session(None).await;
        self.local.clear_all().await?;
        info!("Logged out");
        Ok(())
    }

    /// Removes only the keys in this layer's namespace.
    pub async fn clear_local_data(&self) -> SyncResult<usize> {
        let removed = self.local.clear_namespace().await?;
        self.auth.restore_session(None).await;
        Ok(removed)
    }

    /// Starts a GitHub sign-in that returns to the application origin.
    pub async fn sign_in_with_github(&self) -> SyncResult<OAuthRedirect> {
        let redirect = self
            .auth
            .oauth_redirect(OAuthProvider::Github, &self.app_origin)
            .await?;
        info!(provider = %redirect.provider, "OAuth sign-in started");
        Ok(redirect)
    }

    /// Signs in with email and password and records the session.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> SyncResult<User> {
        validate_credentials(email, password)?;
        let session = self.auth.sign_in_with_password(email, password).await?;
        self.save_session(&session).await?;
        Ok(session.user)
    }

    /// Registers a new account. Never records a session.
    pub async fn sign_up(&self, email: &str, password: &str) -> SyncResult<SignUpOutcome> {
        validate_credentials(email, password)?;
        let outcome = self.auth.sign_up(email, password).await?;
        info!(email, "Account registered");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::test_support::{fixture, FakeRemote};
    use nabil_core::AuthTokens;
    use nabil_db::KeyValueStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_save_and_get_user() {
        let fx = fixture();
        assert_eq!(fx.session.get_user().await.unwrap(), None);

        let user = User::new("u-1").with_email("nabil@example.com");
        fx.session.save_user(&user).await.unwrap();
        assert_eq!(fx.session.get_user().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let fx = fixture();
        let session = AuthSession {
            user: User::new("u-1"),
            tokens: AuthTokens::new("jwt-1"),
        };
        fx.session.save_session(&session).await.unwrap();
        fx.store.set("NabilInventory_products", "[]").await.unwrap();
        fx.store.set("theme", "dark").await.unwrap();

        fx.session.logout().await.unwrap();

        assert!(fx.store.is_empty().await);
        assert_eq!(fx.remote.token(), None);
        assert_eq!(fx.session.get_user().await.unwrap(), None);
        assert_eq!(fx.remote.sign_outs(), 1);
    }

    #[tokio::test]
    async fn test_logout_survives_remote_failure() {
        let fx = fixture();
        fx.session.save_user(&User::new("u-1")).await.unwrap();
        fx.remote.set_offline(true);

        fx.session.logout().await.unwrap();
        assert_eq!(fx.session.get_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_local_data_keeps_foreign_keys() {
        let fx = fixture();
        fx.session.save_user(&User::new("u-1")).await.unwrap();
        fx.store.set("theme", "dark").await.unwrap();

        assert_eq!(fx.session.clear_local_data().await.unwrap(), 1);
        assert_eq!(fx.store.keys().await.unwrap(), vec!["theme"]);
    }

    #[tokio::test]
    async fn test_password_sign_in_saves_session() {
        let fx = fixture();
        fx.remote.add_account("nabil@example.com", "secret1");

        let user = fx
            .session
            .sign_in_with_password("nabil@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("nabil@example.com"));
        assert_eq!(fx.session.get_user().await.unwrap(), Some(user));
        assert_eq!(
            fx.access.local().session().load_tokens().await.unwrap(),
            Some(AuthTokens::new("token-nabil@example.com"))
        );
        assert_eq!(
            fx.remote.token().as_deref(),
            Some("token-nabil@example.com")
        );
    }

    #[tokio::test]
    async fn test_restore_hands_stored_tokens_to_remote() {
        let fx = fixture();
        let session = AuthSession {
            user: User::new("u-1"),
            tokens: AuthTokens::new("jwt-1"),
        };
        fx.session.save_session(&session).await.unwrap();

        let remote = Arc::new(FakeRemote::new());
        let restarted = SessionManager::new(
            fx.access.local().clone(),
            remote.clone(),
            crate::test_support::TEST_ORIGIN,
        );
        assert!(restarted.restore().await.unwrap());
        assert_eq!(remote.token().as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn test_restore_without_tokens() {
        let fx = fixture();
        assert!(!fx.session.restore().await.unwrap());

        fx.session.save_user(&User::new("u-1")).await.unwrap();
        assert!(!fx.session.restore().await.unwrap());
        assert_eq!(fx.remote.token(), None);
    }

    #[tokio::test]
    async fn test_bad_password_propagates() {
        let fx = fixture();
        fx.remote.add_account("nabil@example.com", "secret1");

        let err = fx
            .session
            .sign_in_with_password("nabil@example.com", "wrong-one")
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(fx.session.get_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_credentials_checked_before_remote() {
        let fx = fixture();
        let err = fx.session.sign_in_with_password("", "x").await.unwrap_err();
        assert!(matches!(err, SyncError::Invalid(_)));
        assert_eq!(fx.remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_sign_up_does_not_create_session() {
        let fx = fixture();
        let outcome = fx.session.sign_up("new@example.com", "secret1").await.unwrap();
        assert_eq!(
            outcome,
            SignUpOutcome::ConfirmationSent {
                email: "new@example.com".into()
            }
        );
        assert_eq!(fx.session.get_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_github_redirects_to_origin() {
        let fx = fixture();
        let redirect = fx.session.sign_in_with_github().await.unwrap();
        assert_eq!(redirect.provider, OAuthProvider::Github);
        assert!(redirect.url.contains("redirect_to=http://localhost:5173"));
    }

    #[tokio::test]
    async fn test_github_failure_propagates() {
        let remote = Arc::new(FakeRemote::new());
        remote.set_oauth_disabled(true);
        let fx = crate::test_support::fixture_with(remote);

        let err = fx.session.sign_in_with_github().await.unwrap_err();
        assert!(matches!(err, SyncError::OAuthFailed(_)));
    }
}
