//! Scriptable in-memory identity provider.
//!
//! Backs the demo binary and the coordinator tests. Mirrors the hosted
//! provider's error behavior (duplicate emails, wrong passwords, weak
//! passwords) and emits session-change events through the same channel
//! shape, so the coordinator cannot tell the two apart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use crate::error::ProviderError;
use crate::provider::IdentityProvider;
use crate::session::SessionUser;

#[cfg(test)]
#[path = "mock_test.rs"]
mod mock_test;

const MIN_PASSWORD_LEN: usize = 6;

/// Prefix of the federated id tokens the mock accepts ("google:<email>").
const FEDERATED_TOKEN_PREFIX: &str = "google:";

#[derive(Debug, Clone)]
struct Account {
    user: SessionUser,
    password: String,
}

/// In-memory [`IdentityProvider`] with scriptable failures.
pub struct MockProvider {
    accounts: Mutex<HashMap<String, Account>>,
    fail_next: Mutex<Option<ProviderError>>,
    sessions: watch::Sender<Option<SessionUser>>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
            sessions,
        }
    }

    /// Seed an account with a fixed uid.
    #[must_use]
    pub async fn with_user(self, uid: &str, name: &str, email: &str, password: &str) -> Self {
        let user = SessionUser {
            uid: uid.to_owned(),
            email: Some(email.to_owned()),
            display_name: Some(name.to_owned()),
            photo_url: None,
        };
        self.accounts
            .lock()
            .await
            .insert(email.to_owned(), Account { user, password: password.to_owned() });
        self
    }

    /// Fail the next operation with `err` (single-shot).
    pub async fn fail_next(&self, err: ProviderError) {
        *self.fail_next.lock().await = Some(err);
    }

    /// Push an independent session-change event, as the hosted provider does
    /// on session expiry or sign-in from another surface.
    pub fn emit(&self, user: Option<SessionUser>) {
        self.sessions.send_replace(user);
    }

    async fn take_scripted_failure(&self) -> Result<(), ProviderError> {
        match self.fail_next.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn establish(&self, user: &SessionUser) {
        self.sessions.send_replace(Some(user.clone()));
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ProviderError> {
        self.take_scripted_failure().await?;
        if !email.contains('@') {
            return Err(ProviderError::new("invalid-email", "INVALID_EMAIL"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new("weak-password", "WEAK_PASSWORD"));
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(ProviderError::new("email-already-in-use", "EMAIL_EXISTS"));
        }
        let user = SessionUser {
            uid: Uuid::new_v4().to_string(),
            email: Some(email.to_owned()),
            display_name: Some(name.to_owned()),
            photo_url: None,
        };
        accounts.insert(email.to_owned(), Account { user: user.clone(), password: password.to_owned() });
        drop(accounts);

        self.establish(&user);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ProviderError> {
        self.take_scripted_failure().await?;
        let accounts = self.accounts.lock().await;
        let Some(account) = accounts.get(email) else {
            return Err(ProviderError::new("user-not-found", "EMAIL_NOT_FOUND"));
        };
        if account.password != password {
            return Err(ProviderError::new("wrong-password", "INVALID_PASSWORD"));
        }
        let user = account.user.clone();
        drop(accounts);

        self.establish(&user);
        Ok(user)
    }

    async fn sign_in_with_token(&self, id_token: &str) -> Result<SessionUser, ProviderError> {
        self.take_scripted_failure().await?;
        let Some(email) = id_token.strip_prefix(FEDERATED_TOKEN_PREFIX) else {
            return Err(ProviderError::new("invalid-credential", "INVALID_IDP_RESPONSE"));
        };

        // Federated sign-in creates the account on first use.
        let mut accounts = self.accounts.lock().await;
        let account = accounts.entry(email.to_owned()).or_insert_with(|| {
            let local = email.split('@').next().unwrap_or("user");
            Account {
                user: SessionUser {
                    uid: Uuid::new_v4().to_string(),
                    email: Some(email.to_owned()),
                    display_name: Some(local.to_owned()),
                    photo_url: None,
                },
                password: String::new(),
            }
        });
        let user = account.user.clone();
        drop(accounts);

        self.establish(&user);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.take_scripted_failure().await?;
        self.sessions.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.take_scripted_failure().await?;
        if !self.accounts.lock().await.contains_key(email) {
            return Err(ProviderError::new("user-not-found", "EMAIL_NOT_FOUND"));
        }
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.sessions.subscribe()
    }
}
