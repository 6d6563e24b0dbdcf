//! Demo composition root: wires a coordinator to the in-memory provider and
//! walks the auth flows the app screens exercise.

use std::sync::Arc;

use jobprep::providers::mock::MockProvider;
use jobprep::{RouteGroup, SessionCoordinator, redirect_for};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let provider = Arc::new(MockProvider::new());
    let coordinator = SessionCoordinator::new(Arc::clone(&provider));

    // Wait for the initial session-change notification to settle.
    let mut state = coordinator.watch();
    state.wait_for(|s| !s.loading).await.expect("coordinator gone");

    let outcome = coordinator
        .sign_up("Ann", "ann@example.com", "hunter22")
        .await
        .expect("sign-up failed");
    tracing::info!(message = %outcome.message, "signed up");

    let redirect = redirect_for(&coordinator.state(), RouteGroup::Auth);
    tracing::info!(?redirect, "guard decision after sign-up");

    let message = coordinator.sign_out().await.expect("sign-out failed");
    tracing::info!(%message, "signed out");

    if let Err(err) = coordinator.sign_in("ann@example.com", "wrong").await {
        tracing::info!(code = err.code(), message = %err, "sign-in rejected as expected");
    }

    let outcome = coordinator
        .sign_in("ann@example.com", "hunter22")
        .await
        .expect("sign-in failed");
    tracing::info!(message = %outcome.message, "signed back in");

    let redirect = redirect_for(&coordinator.state(), RouteGroup::Tabs);
    tracing::info!(?redirect, "guard decision on the tabs");
}
