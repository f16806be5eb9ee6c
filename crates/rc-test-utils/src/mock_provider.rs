//! In-memory conferencing provider mock.
//!
//! Maintains a set of live meeting ids so stale-record behavior falls out
//! naturally: `create_attendee` on a meeting that was deleted (or never
//! existed) yields `ProviderMeetingNotFound`, exactly like the real
//! provider. Records every call for assertions and supports one-shot
//! scripted failures per operation.
//!
//! # Example
//!
//! ```rust,ignore
//! let provider = MockProvider::new();
//!
//! let meeting = provider.create_meeting(&request).await?;
//! provider.delete_meeting(&meeting.meeting_id).await?;
//!
//! // The meeting is gone; admission now fails with the stale signal.
//! let err = provider.create_attendee(&meeting.meeting_id, &user).await;
//! assert!(matches!(err, Err(RcError::ProviderMeetingNotFound(_))));
//! ```

use async_trait::async_trait;
use common::types::ExternalUserId;
use rc_service::errors::RcError;
use rc_service::models::{ProviderAttendee, ProviderMeeting};
use rc_service::services::provider_client::{ConferenceProviderGateway, CreateMeetingRequest};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// A failure to script into the mock, materialized as a fresh `RcError`
/// when the call happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    BadRequest,
    Unavailable,
    MeetingNotFound,
}

impl ScriptedFailure {
    fn materialize(self, operation: &str) -> RcError {
        match self {
            ScriptedFailure::BadRequest => {
                RcError::ProviderBadRequest(format!("scripted failure in {operation}"))
            }
            ScriptedFailure::Unavailable => {
                RcError::ProviderUnavailable(format!("scripted failure in {operation}"))
            }
            ScriptedFailure::MeetingNotFound => {
                RcError::ProviderMeetingNotFound(format!("scripted failure in {operation}"))
            }
        }
    }
}

#[derive(Debug, Default)]
struct MockProviderInner {
    /// Meetings currently live on the "provider" side.
    live_meetings: HashSet<String>,
    /// Monotonic counters for generated ids.
    next_meeting: u32,
    next_attendee: u32,
    /// Call recording.
    create_meeting_calls: u32,
    create_attendee_calls: u32,
    deleted_meetings: Vec<String>,
    /// One-shot scripted failures, consumed on the next matching call.
    fail_create_meeting: Option<ScriptedFailure>,
    fail_create_attendee: Option<ScriptedFailure>,
    fail_delete_meeting: Option<ScriptedFailure>,
}

/// Mock conferencing provider for coordinator tests.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    inner: Arc<Mutex<MockProviderInner>>,
}

impl MockProvider {
    /// Create a new empty mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `create_meeting` call to fail.
    pub fn fail_next_create_meeting(&self, failure: ScriptedFailure) {
        self.inner.lock().unwrap().fail_create_meeting = Some(failure);
    }

    /// Script the next `create_attendee` call to fail.
    pub fn fail_next_create_attendee(&self, failure: ScriptedFailure) {
        self.inner.lock().unwrap().fail_create_attendee = Some(failure);
    }

    /// Script the next `delete_meeting` call to fail.
    pub fn fail_next_delete_meeting(&self, failure: ScriptedFailure) {
        self.inner.lock().unwrap().fail_delete_meeting = Some(failure);
    }

    /// Drop a meeting from the live set without recording a deletion,
    /// simulating provider-side expiry behind the RC's back.
    pub fn forget_meeting(&self, meeting_id: &str) {
        self.inner.lock().unwrap().live_meetings.remove(meeting_id);
    }

    /// Number of `create_meeting` calls observed.
    #[must_use]
    pub fn create_meeting_calls(&self) -> u32 {
        self.inner.lock().unwrap().create_meeting_calls
    }

    /// Number of `create_attendee` calls observed.
    #[must_use]
    pub fn create_attendee_calls(&self) -> u32 {
        self.inner.lock().unwrap().create_attendee_calls
    }

    /// Meeting ids deleted through the gateway, in call order.
    #[must_use]
    pub fn deleted_meetings(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted_meetings.clone()
    }

    /// True while the meeting is live on the provider side.
    #[must_use]
    pub fn is_live(&self, meeting_id: &str) -> bool {
        self.inner.lock().unwrap().live_meetings.contains(meeting_id)
    }
}

#[async_trait]
impl ConferenceProviderGateway for MockProvider {
    async fn create_meeting(
        &self,
        request: &CreateMeetingRequest,
    ) -> Result<ProviderMeeting, RcError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(failure) = inner.fail_create_meeting.take() {
            return Err(failure.materialize("create_meeting"));
        }

        inner.create_meeting_calls += 1;
        inner.next_meeting += 1;
        let meeting_id = format!("mock-meeting-{}", inner.next_meeting);
        inner.live_meetings.insert(meeting_id.clone());

        let descriptor = json!({
            "meeting_id": meeting_id,
            "media_region": request.media_region,
            "media_placement": {
                "audio_host": format!("audio-{}.mock.example.com:3478", request.media_region),
                "signaling_url": format!("wss://signal-{}.mock.example.com", request.media_region),
            },
            "features": {
                "echo_reduction": request.features.echo_reduction,
            },
        });

        Ok(ProviderMeeting {
            meeting_id,
            descriptor,
        })
    }

    async fn create_attendee(
        &self,
        meeting_id: &str,
        external_user_id: &ExternalUserId,
    ) -> Result<ProviderAttendee, RcError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(failure) = inner.fail_create_attendee.take() {
            return Err(failure.materialize("create_attendee"));
        }

        if !inner.live_meetings.contains(meeting_id) {
            return Err(RcError::ProviderMeetingNotFound(meeting_id.to_string()));
        }

        inner.create_attendee_calls += 1;
        inner.next_attendee += 1;
        let attendee_id = format!("mock-attendee-{}", inner.next_attendee);

        let descriptor = json!({
            "attendee_id": attendee_id,
            "external_user_id": external_user_id.to_string(),
            "join_token": format!("jt-{}", inner.next_attendee),
        });

        Ok(ProviderAttendee {
            attendee_id,
            descriptor,
        })
    }

    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), RcError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(failure) = inner.fail_delete_meeting.take() {
            return Err(failure.materialize("delete_meeting"));
        }

        if inner.live_meetings.remove(meeting_id) {
            inner.deleted_meetings.push(meeting_id.to_string());
            Ok(())
        } else {
            Err(RcError::ProviderMeetingNotFound(meeting_id.to_string()))
        }
    }
}
