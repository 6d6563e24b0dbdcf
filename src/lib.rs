//! Auth/session core for the JobPrep app.
//!
//! ARCHITECTURE
//! ============
//! The [`SessionCoordinator`] is the single point of truth for auth state.
//! It wraps an [`IdentityProvider`] (the external service that verifies
//! credentials), applies its session-change events, and exposes a cloneable
//! [`AuthState`] snapshot plus a watch stream for UI re-rendering and
//! navigation decisions.
//!
//! The coordinator is an explicit instance handed to whoever needs it — no
//! global singleton. Screens call its operations; the navigation guard reads
//! its state through [`guard::redirect_for`].

pub mod coordinator;
pub mod error;
pub mod guard;
pub mod provider;
pub mod providers;
pub mod session;

pub use coordinator::{AuthOutcome, AuthState, SessionCoordinator};
pub use error::{AuthError, ProviderError};
pub use guard::{Redirect, RouteGroup, redirect_for};
pub use provider::IdentityProvider;
pub use session::SessionUser;
