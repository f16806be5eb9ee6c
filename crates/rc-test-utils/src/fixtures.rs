//! Pre-configured test data and wiring helpers.

use crate::mem_store::MemStore;
use crate::mock_provider::MockProvider;
use chrono::Duration;
use common::types::TeamId;
use rc_service::models::{EndRequest, JoinRequest, MeetingFeatures};
use rc_service::services::{CoordinatorSettings, SessionCoordinator};
use std::sync::Arc;

/// Default team used by fixture requests.
pub const TEST_TEAM: &str = "team-42";

/// Coordinator settings suitable for tests: one-hour TTLs, a fixed
/// default region.
#[must_use]
pub fn test_settings() -> CoordinatorSettings {
    CoordinatorSettings {
        default_media_region: "us-east-1".to_string(),
        meeting_record_ttl: Duration::hours(1),
        attendee_record_ttl: Duration::hours(1),
    }
}

/// Wire a coordinator over a mock provider and a shared in-memory store.
#[must_use]
pub fn coordinator(provider: Arc<MockProvider>, store: Arc<MemStore>) -> SessionCoordinator {
    SessionCoordinator::new(
        provider,
        store.clone(),
        store.clone(),
        store,
        test_settings(),
    )
}

/// A join request for `attendee_name` into `title`, email derived from
/// the name.
#[must_use]
pub fn join_request(title: &str, attendee_name: &str) -> JoinRequest {
    JoinRequest {
        title: title.to_string(),
        attendee_name: attendee_name.to_string(),
        user_email: format!("{}@example.com", attendee_name.to_lowercase()),
        team_id: TeamId::new(TEST_TEAM),
        media_region: None,
        features: MeetingFeatures::default(),
    }
}

/// An end request for `participant_name` in `title`.
#[must_use]
pub fn end_request(title: &str, participant_name: &str, termination_authority: bool) -> EndRequest {
    EndRequest {
        title: title.to_string(),
        termination_authority,
        participant_name: participant_name.to_string(),
        user_email: format!("{}@example.com", participant_name.to_lowercase()),
    }
}
