//! Firebase Authentication over the Identity Toolkit and Secure Token REST
//! APIs.

use super::{token_preview, AuthError, AuthProvider, Session};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Fallback token lifetime when the response omits a usable `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Email/password authentication against a Firebase project.
pub struct FirebaseAuth {
    http_client: Client,
    api_key: String,
    auth_url: String,
    token_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
}

/// The Secure Token API answers in snake_case.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    pub fn new(
        api_key: impl Into<String>,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, base: &str, method: &str) -> Result<Url, AuthError> {
        Url::parse_with_params(&format!("{base}/{method}"), &[("key", &self.api_key)])
            .map_err(|e| AuthError::Rejected(format!("invalid auth endpoint: {e}")))
    }

    async fn password_exchange(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = self.endpoint(&self.auth_url, method)?;
        info!("Firebase auth request: {} for {}", method, email);

        let response = self
            .http_client
            .post(url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let response = check(response, method).await?;
        let body: PasswordResponse = response.json().await?;
        debug!(
            "Firebase auth {} ok: user={}, token={}",
            method,
            body.local_id,
            token_preview(&body.id_token)
        );

        Ok(Session {
            user_id: body.local_id,
            email: if body.email.is_empty() {
                email.to_string()
            } else {
                body.email
            },
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(&body.expires_in),
        })
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.password_exchange("accounts:signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.password_exchange("accounts:signUp", email, password)
            .await
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let url = self.endpoint(&self.token_url, "token")?;
        debug!(
            "Refreshing ID token with refresh token {}",
            token_preview(&session.refresh_token)
        );

        let response = self
            .http_client
            .post(url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form_encode(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &session.refresh_token),
            ]))
            .send()
            .await?;

        let response = check(response, "token").await?;
        let body: RefreshResponse = response.json().await?;

        Ok(Session {
            user_id: body.user_id,
            email: session.email.clone(),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at: expiry_from(&body.expires_in),
        })
    }
}

/// Turn a non-success response into an [`AuthError`].
async fn check(response: Response, method: &str) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    error!("Firebase auth {} failed ({}): {}", method, status, text);
    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(envelope) => Err(AuthError::from_provider_message(&envelope.error.message)),
        Err(_) => Err(AuthError::Rejected(format!(
            "authentication service returned {status}"
        ))),
    }
}

fn expiry_from(expires_in: &str) -> chrono::DateTime<Utc> {
    let secs = expires_in
        .trim()
        .parse::<i64>()
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + Duration::seconds(secs)
}

/// `application/x-www-form-urlencoded` body, using the URL crate's encoder.
fn form_encode(pairs: &[(&str, &str)]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return String::new();
    };
    url.query_pairs_mut().extend_pairs(pairs);
    url.query().unwrap_or_default().to_string()
}
