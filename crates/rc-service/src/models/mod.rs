//! Room Controller models.
//!
//! Records as stored in the database, the opaque provider descriptors,
//! and the request/outcome types of the coordinator API.

use crate::errors::RcError;
use chrono::{DateTime, Duration, Utc};
use common::types::{RoomTitle, TeamId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Provider meeting descriptor.
///
/// The descriptor is opaque to this system apart from the provider-assigned
/// meeting id; it is stored verbatim in the meeting record and handed back
/// to joiners so their client SDK can attach to the meeting.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderMeeting {
    /// Provider-assigned meeting identifier.
    pub meeting_id: String,

    /// Full provider payload, passed through untouched.
    pub descriptor: Value,
}

impl ProviderMeeting {
    /// Build from a raw provider payload, extracting the meeting id.
    pub fn from_descriptor(descriptor: Value) -> Result<Self, RcError> {
        let meeting_id = descriptor
            .get("meeting_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RcError::Serialization("provider meeting payload has no meeting_id".to_string())
            })?
            .to_string();

        Ok(Self {
            meeting_id,
            descriptor,
        })
    }

    /// Serialize the descriptor for storage in a meeting record.
    pub fn to_blob(&self) -> Result<Vec<u8>, RcError> {
        Ok(serde_json::to_vec(&self.descriptor)?)
    }

    /// Deserialize a stored meeting-record blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self, RcError> {
        let descriptor: Value = serde_json::from_slice(blob)?;
        Self::from_descriptor(descriptor)
    }
}

/// Provider attendee descriptor, opaque apart from the attendee id.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderAttendee {
    /// Provider-assigned attendee identifier.
    pub attendee_id: String,

    /// Full provider payload, passed through untouched.
    pub descriptor: Value,
}

impl ProviderAttendee {
    /// Build from a raw provider payload, extracting the attendee id.
    pub fn from_descriptor(descriptor: Value) -> Result<Self, RcError> {
        let attendee_id = descriptor
            .get("attendee_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RcError::Serialization("provider attendee payload has no attendee_id".to_string())
            })?
            .to_string();

        Ok(Self {
            attendee_id,
            descriptor,
        })
    }
}

/// Meeting record: one per live room title.
#[derive(Debug, Clone)]
pub struct MeetingRecord {
    /// Normalized room title (unique key).
    pub title: RoomTitle,

    /// Serialized provider meeting descriptor (opaque blob).
    pub provider_meeting: Vec<u8>,

    /// Logical expiry; an expired record reads as absent.
    pub expires_at: DateTime<Utc>,
}

impl MeetingRecord {
    /// Decode the stored provider meeting descriptor.
    pub fn decode_provider_meeting(&self) -> Result<ProviderMeeting, RcError> {
        ProviderMeeting::from_blob(&self.provider_meeting)
    }
}

/// New meeting record; the store computes `expires_at = now + ttl`.
#[derive(Debug, Clone)]
pub struct NewMeetingRecord {
    pub title: RoomTitle,
    pub provider_meeting: Vec<u8>,
    pub ttl: Duration,
}

/// Attendee record: one per (title, provider attendee id).
#[derive(Debug, Clone)]
pub struct AttendeeRecord {
    pub title: RoomTitle,
    pub attendee_id: String,
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

/// New attendee record; the store computes `expires_at = now + ttl`.
#[derive(Debug, Clone)]
pub struct NewAttendeeRecord {
    pub title: RoomTitle,
    pub attendee_id: String,
    pub display_name: String,
    pub ttl: Duration,
}

/// Occupancy interval status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalStatus {
    /// Interval is open; the room is occupied.
    Open,

    /// Interval has been closed by a room termination.
    Closed,
}

impl IntervalStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            IntervalStatus::Open => "open",
            IntervalStatus::Closed => "closed",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "open" => IntervalStatus::Open,
            // The CHECK constraint admits only the two values; anything
            // unexpected reads as closed so it can never be re-closed.
            _ => IntervalStatus::Closed,
        }
    }
}

/// Room-level occupancy interval.
#[derive(Debug, Clone)]
pub struct OccupancyRecord {
    pub occupancy_id: Uuid,
    pub team_id: TeamId,
    pub title: RoomTitle,
    pub attendee_name: String,
    pub user_email: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: IntervalStatus,
}

/// Seed for a room-level occupancy interval, opened with `status=open`.
#[derive(Debug, Clone)]
pub struct NewOccupancyInterval {
    pub team_id: TeamId,
    pub title: RoomTitle,
    pub attendee_name: String,
    pub user_email: String,
}

/// Participant-level usage interval.
#[derive(Debug, Clone)]
pub struct ParticipantUsageRecord {
    pub usage_id: Uuid,
    pub title: RoomTitle,
    pub participant_identity: String,
    pub user_email: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ParticipantUsageRecord {
    /// True while the interval has not been closed.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Seed for a participant-level usage interval.
#[derive(Debug, Clone)]
pub struct NewUsageInterval {
    pub title: RoomTitle,
    pub participant_identity: String,
    pub user_email: String,
}

/// Meeting feature toggles forwarded to the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingFeatures {
    /// Provider-side echo reduction.
    #[serde(default)]
    pub echo_reduction: bool,
}

/// Join request as handed over by the front door.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    /// Caller-supplied room title; normalized by the coordinator.
    pub title: String,

    /// Display name of the joining attendee.
    pub attendee_name: String,

    /// Opaque, pre-validated email from the identity layer.
    pub user_email: String,

    /// Team owning the room.
    pub team_id: TeamId,

    /// Requested media region; the configured default applies when empty.
    #[serde(default)]
    pub media_region: Option<String>,

    /// Meeting feature toggles.
    #[serde(default)]
    pub features: MeetingFeatures,
}

/// Successful join outcome: what the front door returns to the client SDK.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedSession {
    pub meeting: ProviderMeeting,
    pub attendee: ProviderAttendee,
}

/// End request as handed over by the front door.
#[derive(Debug, Clone, Deserialize)]
pub struct EndRequest {
    /// Caller-supplied room title; normalized by the coordinator.
    pub title: String,

    /// Caller-asserted permission to end the room for all participants.
    pub termination_authority: bool,

    /// Identity whose own usage interval is closed.
    pub participant_name: String,

    /// Opaque, pre-validated email from the identity layer.
    pub user_email: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_meeting_blob_round_trip() {
        let descriptor = json!({
            "meeting_id": "m-abc123",
            "media_placement": {"audio_host": "audio.example.com:3478"},
            "media_region": "us-east-1",
        });
        let meeting = ProviderMeeting::from_descriptor(descriptor).unwrap();
        assert_eq!(meeting.meeting_id, "m-abc123");

        let blob = meeting.to_blob().unwrap();
        let decoded = ProviderMeeting::from_blob(&blob).unwrap();
        assert_eq!(decoded.meeting_id, "m-abc123");
        assert_eq!(decoded.descriptor, meeting.descriptor);
    }

    #[test]
    fn test_provider_meeting_rejects_payload_without_id() {
        let err = ProviderMeeting::from_descriptor(json!({"media_region": "us-east-1"}));
        assert!(matches!(err, Err(RcError::Serialization(_))));
    }

    #[test]
    fn test_provider_meeting_rejects_garbage_blob() {
        let err = ProviderMeeting::from_blob(b"not json");
        assert!(matches!(err, Err(RcError::Serialization(_))));
    }

    #[test]
    fn test_provider_attendee_extracts_id() {
        let attendee = ProviderAttendee::from_descriptor(json!({
            "attendee_id": "a-7",
            "join_token": "jt-xyz",
        }))
        .unwrap();
        assert_eq!(attendee.attendee_id, "a-7");
    }

    #[test]
    fn test_interval_status_db_round_trip() {
        assert_eq!(IntervalStatus::Open.as_db_str(), "open");
        assert_eq!(IntervalStatus::Closed.as_db_str(), "closed");
        assert_eq!(IntervalStatus::from_db_str("open"), IntervalStatus::Open);
        assert_eq!(
            IntervalStatus::from_db_str("closed"),
            IntervalStatus::Closed
        );
        assert_eq!(
            IntervalStatus::from_db_str("garbage"),
            IntervalStatus::Closed
        );
    }

    #[test]
    fn test_meeting_features_default_off() {
        let features: MeetingFeatures = serde_json::from_str("{}").unwrap();
        assert!(!features.echo_reduction);
    }

    #[test]
    fn test_join_request_deserializes_with_optional_fields() {
        let req: JoinRequest = serde_json::from_value(json!({
            "title": "Standup-1",
            "attendee_name": "Alice",
            "user_email": "alice@example.com",
            "team_id": "team-42",
        }))
        .unwrap();
        assert!(req.media_region.is_none());
        assert!(!req.features.echo_reduction);
    }
}
