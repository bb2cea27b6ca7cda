//! Integration tests for sign-in, session persistence and sign-out.
//!
//! Uses the offline identity provider and a session file in a temp dir.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rollbook::auth::{
    AuthError, AuthProvider, Authenticator, LocalAuth, Session, SessionHandle, SessionVault,
};
use rollbook::config::Config;
use rollbook::state::{AuthMode, LoginOutcome, LoginState, LOGIN_FAILED};
use rollbook::store::{FirestoreStore, RecordStore};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio::sync::Notify;

/// Provider whose refreshes wait until the test releases them. Sessions it
/// signs in are already due for a refresh.
#[derive(Default)]
struct GatedRefresh {
    entered: Notify,
    release: Notify,
    reject: bool,
}

impl GatedRefresh {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn issue(email: &str) -> Session {
        Session {
            user_id: format!("user-{email}"),
            email: email.to_string(),
            id_token: "stale-id".to_string(),
            refresh_token: format!("refresh-{email}"),
            expires_at: Utc::now(),
        }
    }
}

#[async_trait]
impl AuthProvider for GatedRefresh {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        Ok(Self::issue(email))
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        Ok(Self::issue(email))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.entered.notify_one();
        self.release.notified().await;
        if self.reject {
            return Err(AuthError::SessionExpired);
        }
        Ok(Session {
            id_token: "fresh-id".to_string(),
            refresh_token: format!("{}-next", session.refresh_token),
            expires_at: Utc::now() + Duration::hours(1),
            ..session.clone()
        })
    }
}

fn gated(provider: &Arc<GatedRefresh>, vault: &SessionVault) -> Authenticator {
    Authenticator::new(provider.clone(), SessionHandle::new()).with_vault(vault.clone())
}

fn authenticator(vault: &SessionVault) -> Authenticator {
    Authenticator::new(Arc::new(LocalAuth::new()), SessionHandle::new()).with_vault(vault.clone())
}

fn stored_session(refresh_token: &str) -> Session {
    Session {
        user_id: "local-ann".to_string(),
        email: "ann@school.org".to_string(),
        id_token: "old-id".to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at: Utc::now() - Duration::minutes(5),
    }
}

#[test]
fn sign_in_publishes_and_persists_the_session() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    let auth = authenticator(&vault);
    let mut changes = auth.session().subscribe();
    let runtime = Runtime::new().unwrap();

    let session = runtime
        .block_on(auth.sign_in("ann@school.org", "secret1"))
        .unwrap();

    assert!(changes.has_changed().unwrap());
    assert_eq!(
        changes.borrow_and_update().as_ref().map(|s| s.email.clone()),
        Some("ann@school.org".to_string())
    );
    assert_eq!(vault.load().unwrap(), Some(session));
}

#[test]
fn sign_out_clears_memory_and_disk() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    let auth = authenticator(&vault);
    let runtime = Runtime::new().unwrap();
    runtime
        .block_on(auth.sign_in("ann@school.org", "secret1"))
        .unwrap();

    auth.sign_out();

    assert!(!auth.session().is_signed_in());
    assert_eq!(vault.load().unwrap(), None);
    assert_eq!(
        runtime.block_on(auth.id_token()).unwrap_err(),
        AuthError::NotSignedIn
    );
}

#[test]
fn restore_refreshes_a_stored_session() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    vault.save(&stored_session("local-refresh-ann-1")).unwrap();
    let auth = authenticator(&vault);
    let runtime = Runtime::new().unwrap();

    let restored = runtime.block_on(auth.restore()).unwrap().unwrap();

    assert_eq!(restored.email, "ann@school.org");
    assert_ne!(restored.id_token, "old-id");
    assert!(auth.session().is_signed_in());
    assert_eq!(vault.load().unwrap(), Some(restored));
}

#[test]
fn rejected_stored_session_is_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    vault.save(&stored_session("revoked")).unwrap();
    let auth = authenticator(&vault);
    let runtime = Runtime::new().unwrap();

    let err = runtime.block_on(auth.restore()).unwrap_err();

    assert!(err.invalidates_session());
    assert!(!auth.session().is_signed_in());
    assert_eq!(vault.load().unwrap(), None);
}

#[test]
fn nothing_stored_restores_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    let auth = authenticator(&vault);
    let runtime = Runtime::new().unwrap();

    assert_eq!(runtime.block_on(auth.restore()).unwrap(), None);
}

#[test]
fn failed_login_shows_the_generic_message() {
    let runtime = Runtime::new().unwrap();
    let session = SessionHandle::new();
    let auth = Authenticator::new(Arc::new(LocalAuth::new()), session.clone());
    let mut login = LoginState::new(auth, runtime.handle().clone());

    login.email.set_text("ann@school.org");
    login.password.set_text("short");
    assert!(login.submit());

    assert_eq!(
        login.settle(),
        Some(LoginOutcome::Failed(LOGIN_FAILED.to_string()))
    );
    assert_eq!(login.error.as_deref(), Some(LOGIN_FAILED));
    assert!(!session.is_signed_in());
}

#[test]
fn duplicate_sign_up_explains_itself() {
    let runtime = Runtime::new().unwrap();
    let session = SessionHandle::new();
    let auth = Authenticator::new(Arc::new(LocalAuth::new()), session.clone());
    runtime
        .block_on(auth.sign_up("ann@school.org", "secret1"))
        .unwrap();
    auth.sign_out();

    let mut login = LoginState::new(auth, runtime.handle().clone());
    login.mode = AuthMode::SignUp;
    login.email.set_text("ann@school.org");
    login.password.set_text("secret2");
    login.submit();

    match login.settle() {
        Some(LoginOutcome::Failed(message)) => {
            assert!(message.starts_with("An account with this email already exists"));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn firestore_calls_without_a_session_fail_before_any_request() {
    let mut config = Config::default();
    config.firebase.project_id = "school".to_string();
    // Unroutable: the call must fail on the missing session, not the network.
    config.firebase.firestore_url = "http://127.0.0.1:9".to_string();

    let auth = Authenticator::new(Arc::new(LocalAuth::new()), SessionHandle::new());
    let store = FirestoreStore::new(auth, config.firebase.collection_path());
    let runtime = Runtime::new().unwrap();

    let err = runtime.block_on(store.list_all()).unwrap_err();
    assert!(err.message().contains("not signed in"));
}

#[test]
fn expiring_token_is_refreshed_and_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    let provider = Arc::new(GatedRefresh::default());
    let auth = gated(&provider, &vault);
    let runtime = Runtime::new().unwrap();
    runtime
        .block_on(auth.sign_in("ann@school.org", "secret1"))
        .unwrap();

    provider.release.notify_one();
    let token = runtime.block_on(auth.id_token()).unwrap();

    assert_eq!(token, "fresh-id");
    let stored = vault.load().unwrap().unwrap();
    assert_eq!(stored.refresh_token, "refresh-ann@school.org-next");
    assert_eq!(auth.session().current(), Some(stored));
}

#[test]
fn sign_out_during_token_refresh_stays_signed_out() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    let provider = Arc::new(GatedRefresh::default());
    let auth = gated(&provider, &vault);
    let runtime = Runtime::new().unwrap();
    runtime
        .block_on(auth.sign_in("ann@school.org", "secret1"))
        .unwrap();

    let refreshing = {
        let auth = auth.clone();
        runtime.spawn(async move { auth.id_token().await })
    };
    runtime.block_on(provider.entered.notified());
    auth.sign_out();
    provider.release.notify_one();
    let result = runtime.block_on(refreshing).unwrap();

    assert_eq!(result, Err(AuthError::NotSignedIn));
    assert!(!auth.session().is_signed_in());
    assert_eq!(vault.load().unwrap(), None);
}

#[test]
fn restore_does_not_replace_a_manual_login() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    vault.save(&stored_session("old-refresh")).unwrap();
    let provider = Arc::new(GatedRefresh::default());
    let auth = gated(&provider, &vault);
    let runtime = Runtime::new().unwrap();

    let restoring = {
        let auth = auth.clone();
        runtime.spawn(async move { auth.restore().await })
    };
    runtime.block_on(provider.entered.notified());
    runtime
        .block_on(auth.sign_in("bo@school.org", "secret1"))
        .unwrap();
    provider.release.notify_one();
    let restored = runtime.block_on(restoring).unwrap();

    assert_eq!(restored, Ok(None));
    assert_eq!(
        auth.session().current().map(|s| s.email),
        Some("bo@school.org".to_string())
    );
    assert_eq!(
        vault.load().unwrap().map(|s| s.email),
        Some("bo@school.org".to_string())
    );
}

#[test]
fn rejected_restore_keeps_a_newer_login_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let vault = SessionVault::new(temp_dir.path().join("session.json"));
    vault.save(&stored_session("old-refresh")).unwrap();
    let provider = Arc::new(GatedRefresh::rejecting());
    let auth = gated(&provider, &vault);
    let runtime = Runtime::new().unwrap();

    let restoring = {
        let auth = auth.clone();
        runtime.spawn(async move { auth.restore().await })
    };
    runtime.block_on(provider.entered.notified());
    runtime
        .block_on(auth.sign_in("bo@school.org", "secret1"))
        .unwrap();
    provider.release.notify_one();
    let restored = runtime.block_on(restoring).unwrap();

    assert_eq!(restored, Err(AuthError::SessionExpired));
    assert!(auth.session().is_signed_in());
    assert_eq!(
        vault.load().unwrap().map(|s| s.email),
        Some("bo@school.org".to_string())
    );
}
