//! Session coordinator — single point of truth for auth state.
//!
//! DESIGN
//! ======
//! State lives inside a `tokio::sync::watch` channel: operations and the
//! session-change listener both mutate it through `send_modify`, and
//! consumers (screens, navigation guard) observe it via snapshots or a
//! receiver. Both writers run on the same runtime; ordering between an
//! operation's resolution and an independently-arriving session-change
//! event is not guaranteed, and the last write wins.
//!
//! TRADE-OFFS
//! ==========
//! Operations are not serialized: nothing stops a sign-in and a sign-out
//! racing. Callers are expected to disable triggering controls while
//! `loading`/`is_authenticating` is set. A hung provider call holds the
//! flags indefinitely; there is no timeout.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{AuthError, ProviderError};
use crate::provider::IdentityProvider;
use crate::session::SessionUser;

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;

/// Snapshot of the coordinator's state, as rendered by screens and read by
/// the navigation guard.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The current session, if any.
    pub user: Option<SessionUser>,
    /// A session-change notification is pending or an operation is settling.
    pub loading: bool,
    /// A sign-in/sign-up/federated-sign-in call is in flight. Navigation
    /// must not act on `user` while this is set: the session is about to be
    /// replaced or rejected.
    pub is_authenticating: bool,
    /// Error from the most recent failed operation, until cleared or a new
    /// attempt begins.
    pub last_error: Option<AuthError>,
}

impl Default for AuthState {
    /// `loading` starts true: the session is unknown until the provider's
    /// first session-change notification arrives.
    fn default() -> Self {
        Self { user: None, loading: true, is_authenticating: false, last_error: None }
    }
}

/// Successful authentication outcome: the session plus a greeting message
/// for the success toast.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: SessionUser,
    pub message: String,
}

/// Owns auth state and exposes the credential operations to the UI layer.
///
/// Constructed explicitly and passed by reference to whatever needs it.
/// Subscribes to the provider's session-change stream on creation; the
/// subscription is released when the coordinator is dropped.
pub struct SessionCoordinator<P: IdentityProvider> {
    provider: Arc<P>,
    state: Arc<watch::Sender<AuthState>>,
    listener: JoinHandle<()>,
}

impl<P: IdentityProvider> SessionCoordinator<P> {
    /// Create a coordinator bound to `provider` and start listening for
    /// session-change events.
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let state = Arc::new(state);
        let listener = tokio::spawn(listen(provider.subscribe(), Arc::clone(&state)));
        Self { provider, state, listener }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Observe state changes (UI re-render, navigation guard).
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// The current session, if any.
    #[must_use]
    pub fn user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn is_authenticating(&self) -> bool {
        self.state.borrow().is_authenticating
    }

    /// Error from the most recent failed operation, if not yet cleared.
    #[must_use]
    pub fn last_error(&self) -> Option<AuthError> {
        self.state.borrow().last_error.clone()
    }

    /// Email/password sign-in.
    ///
    /// # Errors
    /// Returns the classified provider error; `last_error` is set to the
    /// same value and any existing session is left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let _flight = Flight::begin(&self.state, true);
        let result = self.provider.sign_in(email, password).await;
        self.settle("sign-in", result, |user| {
            format!("Welcome back, {}!", user.greeting_name())
        })
    }

    /// Create an account with `name` as the display name and sign in.
    ///
    /// # Errors
    /// Returns the classified provider error (e.g. email already
    /// registered, weak password); `last_error` is set to the same value.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, AuthError> {
        let _flight = Flight::begin(&self.state, true);
        let result = self.provider.sign_up(name, email, password).await;
        self.settle("sign-up", result, |user| {
            format!("Welcome, {}! Your account has been created", user.greeting_name())
        })
    }

    /// Sign in with a federated id token.
    ///
    /// # Errors
    /// Returns the classified provider error; `last_error` is set to the
    /// same value and any existing session is left untouched.
    pub async fn sign_in_with_token(&self, id_token: &str) -> Result<AuthOutcome, AuthError> {
        let _flight = Flight::begin(&self.state, true);
        let result = self.provider.sign_in_with_token(id_token).await;
        self.settle("federated-sign-in", result, |user| {
            format!("Welcome back, {}!", user.greeting_name())
        })
    }

    /// Sign out. The session is cleared only once the provider confirms;
    /// on failure the user remains nominally signed in.
    ///
    /// # Errors
    /// Returns the classified provider error; `last_error` is set to the
    /// same value.
    pub async fn sign_out(&self) -> Result<String, AuthError> {
        let _flight = Flight::begin(&self.state, false);
        match self.provider.sign_out().await {
            Ok(()) => {
                self.state.send_modify(|s| s.user = None);
                tracing::info!("signed out");
                Ok("You have been signed out".to_owned())
            }
            Err(err) => Err(self.record_failure("sign-out", err)),
        }
    }

    /// Send a password-reset email. Touches neither `loading`,
    /// `is_authenticating`, nor the session; only `last_error`.
    ///
    /// # Errors
    /// Returns the classified provider error; `last_error` is set to the
    /// same value.
    pub async fn send_password_reset(&self, email: &str) -> Result<String, AuthError> {
        self.state.send_modify(|s| s.last_error = None);
        match self.provider.send_password_reset(email).await {
            Ok(()) => {
                tracing::info!("password reset email sent");
                Ok(format!("Password reset email sent to {email}"))
            }
            Err(err) => Err(self.record_failure("password-reset", err)),
        }
    }

    /// Clear `last_error`. Idempotent; no other state is touched.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    /// Resolve a settled credential operation: store the session on success,
    /// record the classified error on failure. A failed attempt never
    /// touches the existing session.
    fn settle(
        &self,
        op: &'static str,
        result: Result<SessionUser, ProviderError>,
        message: impl FnOnce(&SessionUser) -> String,
    ) -> Result<AuthOutcome, AuthError> {
        match result {
            Ok(user) => {
                self.state.send_modify(|s| s.user = Some(user.clone()));
                tracing::info!(op, uid = %user.uid, "authentication succeeded");
                let message = message(&user);
                Ok(AuthOutcome { user, message })
            }
            Err(err) => Err(self.record_failure(op, err)),
        }
    }

    fn record_failure(&self, op: &'static str, err: ProviderError) -> AuthError {
        let err = AuthError::from(err);
        self.state.send_modify(|s| s.last_error = Some(err.clone()));
        tracing::warn!(op, code = err.code(), "operation failed");
        err
    }
}

impl<P: IdentityProvider> Drop for SessionCoordinator<P> {
    /// Release the session-change subscription.
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Apply provider session-change events to coordinator state. The first
/// observed value settles `loading`; later events track external changes
/// such as session expiry. Last write wins against in-flight operations.
async fn listen(
    mut events: watch::Receiver<Option<SessionUser>>,
    state: Arc<watch::Sender<AuthState>>,
) {
    loop {
        let user = events.borrow_and_update().clone();
        tracing::debug!(signed_in = user.is_some(), "session-change event");
        state.send_modify(|s| {
            s.user = user;
            s.loading = false;
        });
        if events.changed().await.is_err() {
            break;
        }
    }
}

/// Marks an operation in flight. Clears `last_error` and raises the flags on
/// begin; lowers them on drop, so they settle on every exit path, including
/// cancellation at the provider await point.
struct Flight {
    state: Arc<watch::Sender<AuthState>>,
}

impl Flight {
    fn begin(state: &Arc<watch::Sender<AuthState>>, authenticating: bool) -> Self {
        state.send_modify(|s| {
            s.last_error = None;
            s.loading = true;
            s.is_authenticating = authenticating;
        });
        Self { state: Arc::clone(state) }
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.is_authenticating = false;
        });
    }
}
