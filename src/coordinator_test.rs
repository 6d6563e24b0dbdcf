use std::sync::Arc;

use super::*;
use crate::providers::mock::MockProvider;

async fn ready<P: IdentityProvider>(coordinator: &SessionCoordinator<P>) {
    let mut state = coordinator.watch();
    state.wait_for(|s| !s.loading).await.unwrap();
}

async fn seeded() -> Arc<MockProvider> {
    Arc::new(MockProvider::new().with_user("u1", "Ann", "a@b.com", "secret").await)
}

fn ann() -> SessionUser {
    SessionUser {
        uid: "u1".into(),
        email: Some("a@b.com".into()),
        display_name: Some("Ann".into()),
        photo_url: None,
    }
}

// =============================================================================
// initial state
// =============================================================================

#[test]
fn default_state_is_unknown() {
    let state = AuthState::default();
    assert!(state.user.is_none());
    assert!(state.loading);
    assert!(!state.is_authenticating);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn first_session_change_event_settles_loading() {
    let coordinator = SessionCoordinator::new(Arc::new(MockProvider::new()));
    ready(&coordinator).await;
    assert!(!coordinator.loading());
    assert!(coordinator.user().is_none());
}

// =============================================================================
// sign in
// =============================================================================

#[tokio::test]
async fn sign_in_success_sets_session_and_greets() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let outcome = coordinator.sign_in("a@b.com", "secret").await.unwrap();
    assert_eq!(outcome.user, ann());
    assert!(outcome.message.contains("Ann"));

    let state = coordinator.state();
    assert_eq!(state.user, Some(ann()));
    assert!(!state.loading);
    assert!(!state.is_authenticating);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn sign_in_wrong_password_sets_error_and_rethrows() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let err = coordinator.sign_in("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err, AuthError::WrongPassword);
    assert_eq!(err.code(), "wrong-password");

    let state = coordinator.state();
    assert!(state.user.is_none());
    assert_eq!(state.last_error, Some(AuthError::WrongPassword));
    assert!(!state.loading);
    assert!(!state.is_authenticating);
}

#[tokio::test]
async fn sign_in_unknown_email_maps_to_user_not_found() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let err = coordinator.sign_in("nobody@b.com", "secret").await.unwrap_err();
    assert_eq!(err, AuthError::UserNotFound);
}

#[tokio::test]
async fn failed_sign_in_keeps_existing_session() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    coordinator.sign_in("a@b.com", "secret").await.unwrap();
    let err = coordinator.sign_in("a@b.com", "nope").await.unwrap_err();
    assert_eq!(err, AuthError::WrongPassword);
    assert_eq!(coordinator.user(), Some(ann()));
}

#[tokio::test]
async fn sign_in_greets_generically_without_display_name() {
    let provider = Arc::new(MockProvider::new().with_user("u2", "", "b@c.com", "secret").await);
    let coordinator = SessionCoordinator::new(provider);
    ready(&coordinator).await;

    let outcome = coordinator.sign_in("b@c.com", "secret").await.unwrap();
    assert!(outcome.message.contains("there"));
}

// =============================================================================
// sign up
// =============================================================================

#[tokio::test]
async fn sign_up_success_sets_display_name() {
    let coordinator = SessionCoordinator::new(Arc::new(MockProvider::new()));
    ready(&coordinator).await;

    let outcome = coordinator.sign_up("Bob", "bob@b.com", "longenough").await.unwrap();
    assert_eq!(outcome.user.display_name.as_deref(), Some("Bob"));
    assert!(outcome.message.contains("Bob"));
    assert!(coordinator.user().is_some());
}

#[tokio::test]
async fn sign_up_duplicate_email_is_rejected() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let err = coordinator.sign_up("Ann", "a@b.com", "longenough").await.unwrap_err();
    assert_eq!(err, AuthError::EmailAlreadyInUse);
    assert!(err.to_string().contains("already exists"));
    assert!(coordinator.user().is_none());
    assert_eq!(coordinator.last_error(), Some(AuthError::EmailAlreadyInUse));
}

#[tokio::test]
async fn sign_up_weak_password_is_rejected() {
    let coordinator = SessionCoordinator::new(Arc::new(MockProvider::new()));
    ready(&coordinator).await;

    let err = coordinator.sign_up("Bob", "bob@b.com", "abc").await.unwrap_err();
    assert_eq!(err, AuthError::WeakPassword);
}

// =============================================================================
// federated sign in
// =============================================================================

#[tokio::test]
async fn federated_sign_in_succeeds_for_valid_token() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let outcome = coordinator.sign_in_with_token("google:a@b.com").await.unwrap();
    assert_eq!(outcome.user.uid, "u1");
    assert!(coordinator.user().is_some());
}

#[tokio::test]
async fn federated_sign_in_rejects_malformed_token() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let err = coordinator.sign_in_with_token("garbage").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
    assert!(coordinator.user().is_none());
}

// =============================================================================
// sign out
// =============================================================================

#[tokio::test]
async fn sign_out_clears_session_after_confirmation() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;
    coordinator.sign_in("a@b.com", "secret").await.unwrap();

    let message = coordinator.sign_out().await.unwrap();
    assert!(message.contains("signed out"));
    assert!(coordinator.user().is_none());
    assert!(!coordinator.loading());
}

#[tokio::test]
async fn failed_sign_out_keeps_session() {
    let provider = seeded().await;
    let coordinator = SessionCoordinator::new(Arc::clone(&provider));
    ready(&coordinator).await;
    coordinator.sign_in("a@b.com", "secret").await.unwrap();

    provider.fail_next(ProviderError::new("network-request-failed", "offline")).await;
    let err = coordinator.sign_out().await.unwrap_err();
    assert_eq!(err, AuthError::NetworkRequestFailed);
    assert_eq!(coordinator.user(), Some(ann()));
    assert!(!coordinator.loading());
}

// =============================================================================
// password reset
// =============================================================================

#[tokio::test]
async fn password_reset_returns_message_with_email() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let before = coordinator.state();
    let message = coordinator.send_password_reset("a@b.com").await.unwrap();
    assert!(message.contains("a@b.com"));

    // Neither loading nor the session is touched.
    let after = coordinator.state();
    assert_eq!(after.loading, before.loading);
    assert_eq!(after.user, before.user);
    assert!(!after.is_authenticating);
}

#[tokio::test]
async fn password_reset_unknown_email_sets_error() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let err = coordinator.send_password_reset("x@y.com").await.unwrap_err();
    assert_eq!(err, AuthError::UserNotFound);
    assert_eq!(coordinator.last_error(), Some(AuthError::UserNotFound));
}

// =============================================================================
// session-change events
// =============================================================================

#[tokio::test]
async fn external_sign_out_event_clears_session() {
    let provider = seeded().await;
    let coordinator = SessionCoordinator::new(Arc::clone(&provider));
    ready(&coordinator).await;
    coordinator.sign_in("a@b.com", "secret").await.unwrap();

    // Session expiry arrives independently of any coordinator call.
    provider.emit(None);
    let mut state = coordinator.watch();
    state.wait_for(|s| s.user.is_none()).await.unwrap();
}

#[tokio::test]
async fn external_session_event_restores_user() {
    let provider = Arc::new(MockProvider::new());
    let coordinator = SessionCoordinator::new(Arc::clone(&provider));
    ready(&coordinator).await;

    provider.emit(Some(ann()));
    let mut state = coordinator.watch();
    state.wait_for(|s| s.user.is_some()).await.unwrap();
    assert_eq!(coordinator.user(), Some(ann()));
}

// =============================================================================
// error lifecycle
// =============================================================================

#[tokio::test]
async fn new_attempt_clears_previous_error() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    coordinator.sign_in("a@b.com", "nope").await.unwrap_err();
    assert!(coordinator.last_error().is_some());

    coordinator.sign_in("a@b.com", "secret").await.unwrap();
    assert!(coordinator.last_error().is_none());
}

#[tokio::test]
async fn clear_error_removes_last_error() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    coordinator.sign_in("a@b.com", "nope").await.unwrap_err();
    coordinator.clear_error();
    assert!(coordinator.last_error().is_none());
}

#[tokio::test]
async fn clear_error_is_idempotent() {
    let coordinator = SessionCoordinator::new(seeded().await);
    ready(&coordinator).await;

    let before = coordinator.state();
    coordinator.clear_error();
    let after = coordinator.state();
    assert!(after.last_error.is_none());
    assert_eq!(after.user, before.user);
    assert_eq!(after.loading, before.loading);
    assert_eq!(after.is_authenticating, before.is_authenticating);
}

// =============================================================================
// in-flight flags
// =============================================================================

/// Provider whose credential calls never resolve; exposes the mid-flight
/// window the mock settles too quickly to observe.
struct HangingProvider {
    sessions: tokio::sync::watch::Sender<Option<SessionUser>>,
}

impl HangingProvider {
    fn new() -> Self {
        let (sessions, _) = tokio::sync::watch::channel(None);
        Self { sessions }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HangingProvider {
    async fn sign_up(&self, _: &str, _: &str, _: &str) -> Result<SessionUser, ProviderError> {
        std::future::pending().await
    }

    async fn sign_in(&self, _: &str, _: &str) -> Result<SessionUser, ProviderError> {
        std::future::pending().await
    }

    async fn sign_in_with_token(&self, _: &str) -> Result<SessionUser, ProviderError> {
        std::future::pending().await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        std::future::pending().await
    }

    async fn send_password_reset(&self, _: &str) -> Result<(), ProviderError> {
        std::future::pending().await
    }

    fn subscribe(&self) -> tokio::sync::watch::Receiver<Option<SessionUser>> {
        self.sessions.subscribe()
    }
}

#[tokio::test]
async fn sign_in_raises_flags_while_in_flight() {
    let coordinator = Arc::new(SessionCoordinator::new(Arc::new(HangingProvider::new())));
    ready(&coordinator).await;

    let task = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.sign_in("a@b.com", "secret").await }
    });

    let mut state = coordinator.watch();
    state.wait_for(|s| s.is_authenticating).await.unwrap();
    assert!(coordinator.loading());
    task.abort();
}

#[tokio::test]
async fn cancelled_sign_in_still_resets_flags() {
    let coordinator = Arc::new(SessionCoordinator::new(Arc::new(HangingProvider::new())));
    ready(&coordinator).await;

    let task = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.sign_in("a@b.com", "secret").await }
    });

    let mut state = coordinator.watch();
    state.wait_for(|s| s.is_authenticating).await.unwrap();
    task.abort();
    state.wait_for(|s| !s.is_authenticating && !s.loading).await.unwrap();
}
