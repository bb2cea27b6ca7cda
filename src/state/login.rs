//! Login form state: credentials, sign-in/sign-up mode and the pending
//! credential exchange.

use crate::auth::{AuthError, Authenticator, Session};
use crate::utils::{TaskHandle, TaskPoll, TextInput};
use tokio::runtime::Handle;
use tracing::{info, warn};

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Log in",
            AuthMode::SignUp => "Create account",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Result of a finished credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(Session),
    Failed(String),
}

pub struct LoginState {
    auth: Authenticator,
    runtime: Handle,
    pub mode: AuthMode,
    pub focus: LoginField,
    pub email: TextInput,
    pub password: TextInput,
    pub show_password: bool,
    pub error: Option<String>,
    pending: Option<(AuthMode, TaskHandle<Result<Session, AuthError>>)>,
}

impl LoginState {
    pub fn new(auth: Authenticator, runtime: Handle) -> Self {
        Self {
            auth,
            runtime,
            mode: AuthMode::SignIn,
            focus: LoginField::Email,
            email: TextInput::new(),
            password: TextInput::new(),
            show_password: false,
            error: None,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn toggle_mode(&mut self) {
        if self.is_pending() {
            return;
        }
        self.mode = self.mode.toggled();
        self.error = None;
    }

    /// Start the credential exchange. Returns false when refused locally.
    pub fn submit(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        let email = self.email.text().trim().to_string();
        let password = self.password.text().to_string();
        if email.is_empty() || password.is_empty() {
            self.error = Some("Email and password are required.".to_string());
            return false;
        }

        self.error = None;
        let auth = self.auth.clone();
        let mode = self.mode;
        info!(event = "login.started", ?mode, email = %email);
        let handle = TaskHandle::spawn(&self.runtime, async move {
            match mode {
                AuthMode::SignIn => auth.sign_in(&email, &password).await,
                AuthMode::SignUp => auth.sign_up(&email, &password).await,
            }
        });
        self.pending = Some((mode, handle));
        true
    }

    /// Check for the exchange's result without blocking.
    pub fn poll(&mut self) -> Option<LoginOutcome> {
        let (mode, handle) = self.pending.as_mut()?;
        let mode = *mode;
        let result = match handle.try_take() {
            TaskPoll::Pending => return None,
            TaskPoll::Ready(result) => result,
            TaskPoll::Dropped => Err(AuthError::Rejected("login was interrupted".to_string())),
        };
        self.pending = None;
        Some(self.conclude(mode, result))
    }

    /// Block until the pending exchange finishes. Not for use inside the runtime.
    pub fn settle(&mut self) -> Option<LoginOutcome> {
        let (mode, handle) = self.pending.take()?;
        let result = match handle.wait() {
            TaskPoll::Ready(result) => result,
            TaskPoll::Pending | TaskPoll::Dropped => {
                Err(AuthError::Rejected("login was interrupted".to_string()))
            }
        };
        Some(self.conclude(mode, result))
    }

    fn conclude(&mut self, mode: AuthMode, result: Result<Session, AuthError>) -> LoginOutcome {
        match result {
            Ok(session) => {
                self.password.clear();
                LoginOutcome::SignedIn(session)
            }
            Err(e) => {
                warn!(event = "login.failed", ?mode, error = %e);
                let message = match mode {
                    AuthMode::SignIn => LOGIN_FAILED.to_string(),
                    AuthMode::SignUp => sign_up_message(&e),
                };
                self.error = Some(message.clone());
                LoginOutcome::Failed(message)
            }
        }
    }
}

fn sign_up_message(error: &AuthError) -> String {
    let text = error.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => "Sign up failed.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LocalAuth, SessionHandle};
    use std::sync::Arc;

    fn login(runtime: &tokio::runtime::Runtime) -> (LoginState, SessionHandle) {
        let session = SessionHandle::new();
        let auth = Authenticator::new(Arc::new(LocalAuth::new()), session.clone());
        (LoginState::new(auth, runtime.handle().clone()), session)
    }

    #[test]
    fn test_sign_in_publishes_session() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (mut state, session) = login(&runtime);
        state.email.set_text("ann@school.org");
        state.password.set_text("secret1");

        assert!(state.submit());
        assert!(state.is_pending());
        assert!(!state.submit());

        let outcome = state.settle().unwrap();
        assert!(matches!(outcome, LoginOutcome::SignedIn(_)));
        assert!(session.is_signed_in());
        assert_eq!(state.password.text(), "");
    }

    #[test]
    fn test_failed_sign_in_shows_generic_message() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (mut state, session) = login(&runtime);
        state.email.set_text("not-an-email");
        state.password.set_text("secret1");
        state.submit();

        assert_eq!(
            state.settle(),
            Some(LoginOutcome::Failed(LOGIN_FAILED.to_string()))
        );
        assert_eq!(state.error.as_deref(), Some(LOGIN_FAILED));
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_sign_up_reports_provider_reason() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (mut state, _) = login(&runtime);
        state.toggle_mode();
        state.email.set_text("ann@school.org");
        state.password.set_text("123");
        state.submit();

        let Some(LoginOutcome::Failed(message)) = state.settle() else {
            panic!("sign up should fail");
        };
        assert!(message.starts_with("Password is too weak"));
    }

    #[test]
    fn test_empty_credentials_refused_locally() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (mut state, _) = login(&runtime);
        assert!(!state.submit());
        assert!(!state.is_pending());
        assert!(state.error.is_some());
    }
}
