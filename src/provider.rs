//! Identity-provider contract.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::ProviderError;
use crate::session::SessionUser;

/// External service performing credential verification and issuing sessions.
///
/// Besides the credential operations, a provider exposes a session-change
/// stream: the receiver's current value is the provider's present notion of
/// the session, and every change is a session-change event. Events can fire
/// independently of any call the coordinator issued (e.g. session expiry).
/// Dropping the receiver unsubscribes.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Create an account, set its display name to `name`, and sign in.
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ProviderError>;

    /// Email/password sign-in.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ProviderError>;

    /// Sign in with a federated id token (e.g. Google).
    async fn sign_in_with_token(&self, id_token: &str) -> Result<SessionUser, ProviderError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Send a password-reset email.
    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    /// Subscribe to session-change events.
    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>>;
}
