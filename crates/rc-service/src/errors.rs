//! Room Controller error types.
//!
//! Provider failures are classified into a small taxonomy the upstream
//! front door can map to transport status codes; internal details are
//! logged server-side but not exposed to clients.

use thiserror::Error;

/// Room Controller error type.
///
/// Classification drives caller behavior:
/// - `ProviderBadRequest`: not retriable without changing input
/// - `ProviderUnavailable`: transient, caller may retry
/// - `ProviderMeetingNotFound`: a stored record is stale; triggers local
///   cleanup before surfacing
/// - `StaleSession`: surfaced after such cleanup; a retried join recreates
///   the session
/// - `Store`: backing store failure, always surfaced
#[derive(Debug, Error)]
pub enum RcError {
    /// Provider rejected the request input.
    #[error("Provider rejected request: {0}")]
    ProviderBadRequest(String),

    /// Provider-side outage or timeout.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider has no meeting with the given id.
    #[error("Provider meeting not found: {0}")]
    ProviderMeetingNotFound(String),

    /// Stored meeting record pointed at a deleted provider meeting.
    #[error("Stale session for room '{0}', retry to recreate")]
    StaleSession(String),

    /// Backing store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Provider descriptor blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RcError {
    /// Transport status code for the front door to return.
    pub fn status_code(&self) -> u16 {
        match self {
            RcError::ProviderBadRequest(_) => 400,
            RcError::ProviderMeetingNotFound(_) => 404,
            RcError::StaleSession(_) => 409,
            RcError::ProviderUnavailable(_) => 503,
            RcError::Store(_)
            | RcError::Serialization(_)
            | RcError::Config(_)
            | RcError::Internal(_) => 500,
        }
    }

    /// True when the caller may retry the same request unchanged.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            RcError::ProviderUnavailable(_) | RcError::StaleSession(_)
        )
    }

    /// Bounded metric label for this error, one value per variant.
    pub fn reason_label(&self) -> &'static str {
        match self {
            RcError::ProviderBadRequest(_) => "provider_bad_request",
            RcError::ProviderUnavailable(_) => "provider_unavailable",
            RcError::ProviderMeetingNotFound(_) => "provider_meeting_not_found",
            RcError::StaleSession(_) => "stale_session",
            RcError::Store(_) => "store",
            RcError::Serialization(_) => "serialization",
            RcError::Config(_) => "config",
            RcError::Internal(_) => "internal",
        }
    }

    /// Returns a client-safe error message (no internal details).
    pub fn client_message(&self) -> String {
        match self {
            RcError::ProviderBadRequest(_) => "Request rejected".to_string(),
            RcError::ProviderUnavailable(_) => {
                "Conferencing provider unavailable, please retry".to_string()
            }
            RcError::ProviderMeetingNotFound(_) => "Meeting not found".to_string(),
            RcError::StaleSession(_) => {
                "Session expired, please retry to start a new one".to_string()
            }
            RcError::Store(_)
            | RcError::Serialization(_)
            | RcError::Config(_)
            | RcError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<sqlx::Error> for RcError {
    fn from(err: sqlx::Error) -> Self {
        RcError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for RcError {
    fn from(err: serde_json::Error) -> Self {
        RcError::Serialization(err.to_string())
    }
}
