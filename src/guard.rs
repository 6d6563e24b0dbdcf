//! Navigation-guard decision logic.
//!
//! The guard itself lives in the UI shell; this module is the pure decision
//! it applies on every auth-state or route change.

use crate::coordinator::AuthState;

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

/// Route groups of the app shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// Landing / welcome screen.
    Landing,
    /// Sign-in, sign-up, and forgot-password screens.
    Auth,
    /// Role, skills, and resume onboarding steps.
    Onboarding,
    /// The signed-in tabbed experience (jobs, search, preparation, profile).
    Tabs,
}

/// Where the guard should send the user, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Stay,
    ToLanding,
    ToTabs,
}

/// Decide whether to redirect given the current auth state and route group.
///
/// Never redirects while the session is still settling (`loading`) or an
/// authentication call is in flight (`is_authenticating`): acting on the
/// session during that window would race the operation about to replace or
/// reject it.
#[must_use]
pub fn redirect_for(state: &AuthState, current: RouteGroup) -> Redirect {
    if state.loading || state.is_authenticating {
        return Redirect::Stay;
    }
    match (state.user.is_some(), current) {
        // Signed out on a protected screen: back to the landing page.
        (false, RouteGroup::Tabs) => Redirect::ToLanding,
        // Signed in with an auth screen open: into the app.
        (true, RouteGroup::Auth) => Redirect::ToTabs,
        _ => Redirect::Stay,
    }
}
