use super::{AuthError, AuthProvider, Session};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const MIN_PASSWORD_LEN: usize = 6;

/// Offline identity provider.
///
/// Accounts live in memory for the lifetime of the process. Any
/// well-formed email/password pair signs in; an email that was registered
/// through [`AuthProvider::sign_up`] must use its registered password.
#[derive(Debug, Default)]
pub struct LocalAuth {
    accounts: Mutex<HashMap<String, Account>>,
    issued: AtomicU64,
}

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password: String,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, Account>> {
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn issue(&self, user_id: &str, email: &str) -> Session {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            id_token: format!("local-id-{user_id}-{n}"),
            refresh_token: format!("local-refresh-{user_id}-{n}"),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }
}

fn validate(email: &str, password: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "use at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(email)
}

fn user_id_for(email: &str) -> String {
    format!("local-{}", email.replace(|c: char| !c.is_ascii_alphanumeric(), "-"))
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = match validate(email, password) {
            Ok(email) => email,
            Err(AuthError::WeakPassword(_)) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e),
        };
        let user_id = match self.accounts().get(&email) {
            Some(account) if account.password != password => {
                return Err(AuthError::InvalidCredentials)
            }
            Some(account) => account.user_id.clone(),
            None => user_id_for(&email),
        };
        Ok(self.issue(&user_id, &email))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = validate(email, password)?;
        let user_id = user_id_for(&email);
        {
            let mut accounts = self.accounts();
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailExists);
            }
            accounts.insert(
                email.clone(),
                Account {
                    user_id: user_id.clone(),
                    password: password.to_string(),
                },
            );
        }
        Ok(self.issue(&user_id, &email))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        if !session.refresh_token.starts_with("local-refresh-") {
            return Err(AuthError::SessionExpired);
        }
        Ok(self.issue(&session.user_id, &session.email))
    }
}
