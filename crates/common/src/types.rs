//! Common identifier types for Parley room-controller crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Logical room identifier, caller-supplied and case-normalized.
///
/// Titles arrive from the front door in whatever casing the user typed.
/// All record keys are derived from the normalized form (trimmed,
/// lowercased) so "Standup-1" and "standup-1 " address the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomTitle(String);

impl RoomTitle {
    /// Normalize a caller-supplied title into a room key.
    #[must_use]
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized title string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when normalization left nothing usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team owning a room. Opaque, supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External user identifier handed to the conferencing provider when
/// admitting an attendee. Fresh per admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalUserId(pub Uuid);

impl ExternalUserId {
    /// Create a new random external user ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExternalUserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExternalUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
