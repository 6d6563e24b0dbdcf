//! Firebase Identity Toolkit REST adapter.
//!
//! ARCHITECTURE
//! ============
//! One POST per credential operation against the `accounts:*` endpoints.
//! The REST API has no sign-out call, so sign-out is local: the adapter
//! drops its held id token and emits a signed-out session-change event,
//! matching what the client SDK does.
//!
//! REST failures arrive as an `{ "error": { "message": "EMAIL_EXISTS" } }`
//! body; [`map_rest_error`] translates those into the provider code strings
//! the error taxonomy understands.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{Mutex, watch};

use crate::error::ProviderError;
use crate::provider::IdentityProvider;
use crate::session::SessionUser;

#[cfg(test)]
#[path = "firebase_test.rs"]
mod firebase_test;

const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase project configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub endpoint: String,
}

impl FirebaseConfig {
    /// Load from `FIREBASE_API_KEY`. Returns `None` if missing
    /// (hosted auth disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("FIREBASE_API_KEY").ok()?;
        Some(Self { api_key, endpoint: DEFAULT_ENDPOINT.to_owned() })
    }
}

/// [`IdentityProvider`] backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseProvider {
    config: FirebaseConfig,
    client: reqwest::Client,
    id_token: Mutex<Option<String>>,
    sessions: watch::Sender<Option<SessionUser>>,
}

impl FirebaseProvider {
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        let (sessions, _) = watch::channel(None);
        Self { config, client: reqwest::Client::new(), id_token: Mutex::new(None), sessions }
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let url =
            format!("{}/accounts:{}?key={}", self.config.endpoint, operation, self.config.api_key);
        tracing::debug!(operation, "identity toolkit request");

        let response =
            self.client.post(&url).json(&body).send().await.map_err(|e| transport_error(&e))?;
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| transport_error(&e));
        }
        if status.is_server_error() {
            return Err(ProviderError::new(
                "service-unavailable",
                format!("identity service returned {status}"),
            ));
        }
        let body = response.json::<RestErrorBody>().await.map_err(|e| transport_error(&e))?;
        Err(map_rest_error(&body.error.message))
    }

    /// Store the session token and emit the signed-in session-change event.
    async fn establish(&self, account: AccountResponse) -> SessionUser {
        let user = SessionUser {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
            photo_url: account.photo_url,
        };
        *self.id_token.lock().await = Some(account.id_token);
        self.sessions.send_replace(Some(user.clone()));
        user
    }
}

#[async_trait]
impl IdentityProvider for FirebaseProvider {
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ProviderError> {
        let created: AccountResponse = self
            .post(
                "signUp",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        // New accounts have no display name; set it before reporting success.
        let updated: AccountResponse = self
            .post(
                "update",
                serde_json::json!({
                    "idToken": created.id_token,
                    "displayName": name,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        Ok(self.establish(updated).await)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ProviderError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(self.establish(account).await)
    }

    async fn sign_in_with_token(&self, id_token: &str) -> Result<SessionUser, ProviderError> {
        let account: AccountResponse = self
            .post(
                "signInWithIdp",
                serde_json::json!({
                    "postBody": format!("id_token={id_token}&providerId=google.com"),
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                }),
            )
            .await?;
        Ok(self.establish(account).await)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.id_token.lock().await.take();
        self.sessions.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                serde_json::json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                }),
            )
            .await?;
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.sessions.subscribe()
    }
}

/// Account payload shared by the `signUp`, `signInWithPassword`,
/// `signInWithIdp`, and `update` responses.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "photoUrl", default)]
    photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    error: RestError,
}

#[derive(Debug, Deserialize)]
struct RestError {
    #[serde(default)]
    message: String,
}

fn transport_error(err: &reqwest::Error) -> ProviderError {
    ProviderError::new("network-request-failed", err.to_string())
}

/// Map a REST error message to a provider code string. Messages can carry a
/// trailing reason ("WEAK_PASSWORD : Password should be at least 6
/// characters"); only the leading keyword is matched.
fn map_rest_error(message: &str) -> ProviderError {
    let keyword = message.split([':', ' ']).next().unwrap_or("");
    let code = match keyword {
        "EMAIL_EXISTS" => "email-already-in-use",
        "INVALID_EMAIL" | "MISSING_EMAIL" => "invalid-email",
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => "weak-password",
        "EMAIL_NOT_FOUND" => "user-not-found",
        "INVALID_PASSWORD" => "wrong-password",
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => "invalid-credential",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too-many-requests",
        "QUOTA_EXCEEDED" => "quota-exceeded",
        "USER_DISABLED" => "user-disabled",
        "OPERATION_NOT_ALLOWED" => "operation-not-allowed",
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => "requires-recent-login",
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => "session-expired",
        _ => return ProviderError::new("unknown", message),
    };
    ProviderError::new(code, message)
}
