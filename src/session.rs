//! The locally-held representation of the authenticated identity.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Fallback greeting when the identity carries no display name.
const GENERIC_GREETING_NAME: &str = "there";

/// The currently authenticated identity as held by the coordinator.
/// Owned by the [`SessionCoordinator`](crate::SessionCoordinator); read-only
/// to every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Stable identifier assigned by the identity provider.
    pub uid: String,
    /// Verified email address, if the provider knows one.
    pub email: Option<String>,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar image URL, if available.
    pub photo_url: Option<String>,
}

impl SessionUser {
    /// Name used in greeting messages, falling back to a generic label when
    /// no display name is set.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(GENERIC_GREETING_NAME)
    }
}
