//! Authentication and session management.
//!
//! Credential exchange is delegated to an [`AuthProvider`] (Firebase
//! Authentication, or the offline provider). Session presence lives in a
//! [`SessionHandle`], an explicit object passed to whoever needs it; it is
//! the single place to read the current session and to subscribe to
//! sign-in/sign-out changes.
//!
//! [`Authenticator`] ties the two together with the on-disk
//! [`SessionVault`] so sessions survive restarts.

pub mod firebase;
pub mod local;
pub mod vault;

pub use firebase::FirebaseAuth;
pub use local::LocalAuth;
pub use vault::SessionVault;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// ID tokens expiring within this window are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

/// An authenticated principal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the ID token expires within `margin` from now.
    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &token_preview(&self.id_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Mask a token for logs: first and last four characters only.
pub fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

/// Failure of a credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailExists,
    #[error("password is too weak: {0}")]
    WeakPassword(String),
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("too many attempts, try again later")]
    TooManyAttempts,
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("not signed in")]
    NotSignedIn,
    #[error("{0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Map an Identity Toolkit / Secure Token error message to an error.
    ///
    /// Messages look like `EMAIL_EXISTS` or
    /// `WEAK_PASSWORD : Password should be at least 6 characters`.
    pub fn from_provider_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
                "use at least 6 characters".to_string()
            } else {
                detail.to_string()
            }),
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "USER_DISABLED"
            | "INVALID_GRANT_TYPE" => AuthError::SessionExpired,
            "MISSING_PASSWORD" => AuthError::Rejected("password is required".to_string()),
            other => AuthError::Rejected(other.to_lowercase().replace('_', " ")),
        }
    }

    /// Whether a stored session should be discarded after this error.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, AuthError::SessionExpired | AuthError::InvalidCredentials)
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

/// Identity provider: exchanges credentials for sessions.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Exchange a session's refresh token for a fresh ID token.
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
}

/// Current session plus change notification.
///
/// Cloning is cheap; all clones observe the same session.
#[derive(Clone)]
pub struct SessionHandle {
    sender: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    /// Run `modify` under the channel lock; subscribers are notified only
    /// when it returns `true`.
    fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut Option<Session>) -> bool,
    {
        self.sender.send_if_modified(modify)
    }
}

/// Whether `current` is the session that was issued `refresh_token`.
fn holds_refresh_token(current: Option<&Session>, refresh_token: &str) -> bool {
    current.is_some_and(|session| session.refresh_token == refresh_token)
}

/// Sign-in, sign-up, restore and sign-out over an [`AuthProvider`].
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn AuthProvider>,
    session: SessionHandle,
    vault: Option<SessionVault>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn AuthProvider>, session: SessionHandle) -> Self {
        Self {
            provider,
            session,
            vault: None,
        }
    }

    /// Persist sessions to `vault`.
    pub fn with_vault(mut self, vault: SessionVault) -> Self {
        self.vault = Some(vault);
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.provider.sign_in(email.trim(), password).await?;
        info!("Signed in as {}", session.email);
        self.establish(session.clone());
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.provider.sign_up(email.trim(), password).await?;
        info!("Created account {}", session.email);
        self.establish(session.clone());
        Ok(session)
    }

    /// Restore the session stored in the vault, if any.
    ///
    /// Returns `Ok(None)` when nothing is stored, or when someone signed in
    /// while the stored session was being refreshed. A stored session the
    /// provider rejects is deleted, unless the file has been overwritten by
    /// then.
    pub async fn restore(&self) -> Result<Option<Session>, AuthError> {
        let Some(vault) = &self.vault else {
            return Ok(None);
        };
        let stored = match vault.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Ignoring unreadable session file: {e:#}");
                return Ok(None);
            }
        };

        match self.provider.refresh(&stored).await {
            Ok(session) => {
                if !self.publish_if(session.clone(), |current| current.is_none()) {
                    info!("Signed in during restore; discarding stored session");
                    return Ok(None);
                }
                info!("Restored session for {}", session.email);
                Ok(Some(session))
            }
            Err(e) => {
                if e.invalidates_session() {
                    warn!("Stored session rejected: {e}");
                    self.session.update(|_| {
                        let still_stored = matches!(
                            vault.load(),
                            Ok(Some(on_disk)) if on_disk.refresh_token == stored.refresh_token
                        );
                        if still_stored {
                            if let Err(clear_err) = vault.clear() {
                                warn!("Failed to delete session file: {clear_err:#}");
                            }
                        }
                        false
                    });
                }
                Err(e)
            }
        }
    }

    /// A valid ID token for the current session, refreshing it if needed.
    ///
    /// A refresh that completes after the session was signed out or
    /// replaced is discarded.
    pub async fn id_token(&self) -> Result<String, AuthError> {
        let session = self.session.current().ok_or(AuthError::NotSignedIn)?;
        if !session.expires_within(Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(session.id_token);
        }

        let refreshed = &session.refresh_token;
        match self.provider.refresh(&session).await {
            Ok(fresh) => {
                let token = fresh.id_token.clone();
                if self.publish_if(fresh, |current| holds_refresh_token(current, refreshed)) {
                    return Ok(token);
                }
                info!("Session changed during token refresh; discarding refreshed token");
                match self.session.current() {
                    Some(current)
                        if !current.expires_within(Duration::seconds(REFRESH_MARGIN_SECS)) =>
                    {
                        Ok(current.id_token)
                    }
                    _ => Err(AuthError::NotSignedIn),
                }
            }
            Err(e) => {
                if e.invalidates_session() {
                    self.clear_if(|current| holds_refresh_token(current, refreshed));
                }
                Err(e)
            }
        }
    }

    /// Drop the current session, in memory and on disk.
    pub fn sign_out(&self) {
        self.clear_if(|_| true);
    }

    fn establish(&self, session: Session) {
        self.publish_if(session, |_| true);
    }

    /// Publish and persist `session` if `expected` accepts the current one.
    fn publish_if<F>(&self, session: Session, expected: F) -> bool
    where
        F: FnOnce(Option<&Session>) -> bool,
    {
        self.session.update(|current| {
            if !expected(current.as_ref()) {
                return false;
            }
            if let Some(vault) = &self.vault {
                if let Err(e) = vault.save(&session) {
                    warn!("Failed to persist session: {e:#}");
                }
            }
            *current = Some(session);
            true
        })
    }

    /// Sign out if `expected` accepts the current session.
    fn clear_if<F>(&self, expected: F) -> bool
    where
        F: FnOnce(Option<&Session>) -> bool,
    {
        self.session.update(|current| {
            if !expected(current.as_ref()) {
                return false;
            }
            if let Some(session) = current.as_ref() {
                info!("Signing out {}", session.email);
            }
            if let Some(vault) = &self.vault {
                if let Err(e) = vault.clear() {
                    warn!("Failed to delete session file: {e:#}");
                }
            }
            *current = None;
            true
        })
    }
}
