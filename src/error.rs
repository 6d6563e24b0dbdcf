//! Authentication error taxonomy.
//!
//! DESIGN
//! ======
//! The identity provider fails with an open-ended `(code, message)` pair.
//! The coordinator classifies that into [`AuthError`], a closed sum of the
//! kinds the app knows how to present, plus an `Unknown` variant carrying
//! the provider's raw message. Screens route specific codes to field-level
//! validation (e.g. wrong-password -> password field) via [`AuthError::code`].

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure reported by an identity provider: a provider-defined code string
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

/// Fallback message when an unmapped provider error carries no message.
const GENERIC_AUTH_MESSAGE: &str = "An error occurred during authentication";

/// Classified authentication error. `Display` is the user-facing message
/// shown in toasts and form fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailAlreadyInUse,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password is too weak. Please choose a stronger password")]
    WeakPassword,
    #[error("No account found with this email address")]
    UserNotFound,
    #[error("Incorrect password. Please try again")]
    WrongPassword,
    #[error("Invalid credentials")]
    InvalidCredential,
    #[error("Too many failed attempts. Please try again later")]
    TooManyRequests,
    #[error("Service quota exceeded. Please try again later")]
    QuotaExceeded,
    #[error("Network error. Please check your connection")]
    NetworkRequestFailed,
    #[error("The service is temporarily unavailable. Please try again later")]
    ServiceUnavailable,
    #[error("This account has been disabled")]
    UserDisabled,
    #[error("This operation is not allowed")]
    OperationNotAllowed,
    #[error("Please sign in again to complete this action")]
    RequiresRecentLogin,
    #[error("Your session has expired. Please sign in again")]
    SessionExpired,
    /// Unmapped provider code; carries the provider's raw message.
    #[error("{0}")]
    Unknown(String),
}

impl AuthError {
    /// Stable machine-readable code, mirroring the provider code strings.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::InvalidEmail => "invalid-email",
            Self::WeakPassword => "weak-password",
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidCredential => "invalid-credential",
            Self::TooManyRequests => "too-many-requests",
            Self::QuotaExceeded => "quota-exceeded",
            Self::NetworkRequestFailed => "network-request-failed",
            Self::ServiceUnavailable => "service-unavailable",
            Self::UserDisabled => "user-disabled",
            Self::OperationNotAllowed => "operation-not-allowed",
            Self::RequiresRecentLogin => "requires-recent-login",
            Self::SessionExpired => "session-expired",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Classify a provider failure. Unrecognized codes become
    /// [`AuthError::Unknown`] carrying the provider's message, or a generic
    /// fallback when the message is empty.
    #[must_use]
    pub fn from_provider(code: &str, message: &str) -> Self {
        match code {
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "invalid-email" => Self::InvalidEmail,
            "weak-password" => Self::WeakPassword,
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "invalid-credential" => Self::InvalidCredential,
            "too-many-requests" => Self::TooManyRequests,
            "quota-exceeded" => Self::QuotaExceeded,
            "network-request-failed" => Self::NetworkRequestFailed,
            "service-unavailable" => Self::ServiceUnavailable,
            "user-disabled" => Self::UserDisabled,
            "operation-not-allowed" => Self::OperationNotAllowed,
            "requires-recent-login" => Self::RequiresRecentLogin,
            "session-expired" => Self::SessionExpired,
            _ => {
                let message = message.trim();
                Self::Unknown(if message.is_empty() {
                    GENERIC_AUTH_MESSAGE.to_owned()
                } else {
                    message.to_owned()
                })
            }
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        Self::from_provider(&err.code, &err.message)
    }
}
