//! # Auth Panel Controller
//!
//! Headless state and actions behind the cloud sign-in panel. The UI
//! renders whatever [`AuthPanel::view`] says and forwards button presses.
//!
//! ## View Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Panel Views                                    │
//! │                                                                         │
//! │  config toggle on? ──yes──► Config   (edit URL/key, save + reload)     │
//! │        │no                                                              │
//! │        ▼                                                                │
//! │  signed in? ──yes─────────► Account  (profile, sync now, logout)       │
//! │        │no                                                              │
//! │        ▼                                                                │
//! │  SignIn   (GitHub button, email/password in Login or Register mode)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures of sign-in, sign-up, and GitHub sign-in come back as a
//! [`Notice`] for the UI to show; they never reach the data layer's
//! callers as errors.

use nabil_core::User;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::access::{DataAccess, SyncReport};
use crate::error::{SyncError, SyncResult};
use crate::remote::{OAuthRedirect, SignUpOutcome};
use crate::snapshot::Snapshot;

const SIGN_UP_MESSAGE: &str = "Account created. Check your email to confirm it.";
const AUTH_FALLBACK: &str = "Authentication failed";
const GITHUB_FALLBACK: &str =
    "GitHub sign-in failed. Make sure the GitHub provider is enabled for the project.";

// =============================================================================
// View Types
// =============================================================================

/// Which face of the panel to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PanelView {
    Config,
    Account,
    SignIn,
}

/// Whether the email form signs in or registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Error notice carrying the service's own message when it has one.
    fn from_error(err: &SyncError, fallback: &str) -> Self {
        let message = match err {
            SyncError::AuthFailed(msg) | SyncError::OAuthFailed(msg) if !msg.is_empty() => {
                msg.clone()
            }
            SyncError::Invalid(e) => e.to_string(),
            SyncError::Remote { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        };
        Notice::error(message)
    }
}

/// Successful result of the email form.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Signed in; hand the user to the host's login callback.
    LoggedIn(User),
    /// Registered; show the notice. The form is back in login mode.
    Registered(Notice),
}

// =============================================================================
// Panel
// =============================================================================

/// State of one open panel.
pub struct AuthPanel {
    access: Arc<DataAccess>,
    show_config: bool,
    mode: AuthMode,
    busy: bool,
    github_busy: bool,
    draft_url: String,
    draft_key: String,
}

impl AuthPanel {
    /// Opens the panel with the config form pre-filled from the effective
    /// remote configuration.
    pub async fn open(access: Arc<DataAccess>) -> SyncResult<Self> {
        let config = access.get_config().await?;
        Ok(AuthPanel {
            access,
            show_config: false,
            mode: AuthMode::Login,
            busy: false,
            github_busy: false,
            draft_url: config.url,
            draft_key: config.key,
        })
    }

    pub fn view(&self, user: Option<&User>) -> PanelView {
        if self.show_config {
            PanelView::Config
        } else if user.is_some() {
            PanelView::Account
        } else {
            PanelView::SignIn
        }
    }

    pub fn toggle_config(&mut self) {
        self.show_config = !self.show_config;
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_github_busy(&self) -> bool {
        self.github_busy
    }

    pub fn draft(&self) -> (&str, &str) {
        (&self.draft_url, &self.draft_key)
    }

    pub fn set_draft(&mut self, url: impl Into<String>, key: impl Into<String>) {
        self.draft_url = url.into();
        self.draft_key = key.into();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Submits the email form in the current mode.
    pub async fn submit_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<Submission, Notice> {
        self.busy = true;
        let result = self.run_credentials(email, password).await;
        self.busy = false;

        result.map_err(|e| {
            warn!(mode = ?self.mode, ?e, "Credential submission failed");
            Notice::from_error(&e, AUTH_FALLBACK)
        })
    }

    async fn run_credentials(&mut self, email: &str, password: &str) -> SyncResult<Submission> {
        let session = self.access.session();
        match self.mode {
            AuthMode::Login => {
                let user = session.sign_in_with_password(email, password).await?;
                Ok(Submission::LoggedIn(user))
            }
            AuthMode::Register => {
                let outcome = session.sign_up(email, password).await?;
                if let SignUpOutcome::SignedIn(user) = &outcome {
                    debug!(user_id = %user.id, "Sign-up returned a session, not keeping it");
                }
                self.mode = AuthMode::Login;
                Ok(Submission::Registered(Notice::info(SIGN_UP_MESSAGE)))
            }
        }
    }

    /// Starts GitHub sign-in.
    ///
    /// On success the panel stays busy: the host navigates away to the
    /// returned URL.
    pub async fn start_github(&mut self) -> Result<OAuthRedirect, Notice> {
        self.github_busy = true;
        match self.access.sign_in_with_github().await {
            Ok(redirect) => Ok(redirect),
            Err(e) => {
                self.github_busy = false;
                warn!(?e, "GitHub sign-in could not start");
                Err(Notice::from_error(&e, GITHUB_FALLBACK))
            }
        }
    }

    /// Saves the drafted URL and key, which triggers a reload.
    pub async fn save_config(&self) -> SyncResult<()> {
        self.access
            .save_config(&self.draft_url, &self.draft_key)
            .await
    }

    pub async fn logout(&self) -> SyncResult<()> {
        self.access.logout().await
    }

    /// "Sync now".
    pub async fn sync(&self, collections: &[&str]) -> SyncResult<SyncReport> {
        self.access.sync_all(collections).await
    }

    pub async fn export(&self, collections: &[&str]) -> SyncResult<Snapshot> {
        self.access.export_snapshot(collections).await
    }

    /// Imports a snapshot document chosen by the user.
    pub async fn import(&self, raw: &str) -> SyncResult<BTreeMap<String, usize>> {
        let snapshot = Snapshot::from_json(raw)?;
        self.access.import_snapshot(&snapshot).await
    }
}
