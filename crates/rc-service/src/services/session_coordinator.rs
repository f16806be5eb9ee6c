//! Session coordinator: the create-or-reuse-then-join workflow.
//!
//! The coordinator owns no durable state; it sequences calls to the
//! provider gateway and the stores. It is the only component that decides
//! whether a new provider meeting is needed.
//!
//! Per room title the lifecycle is `NO_SESSION → LIVE → NO_SESSION`; a
//! room can be recreated after termination.
//!
//! # Failure policy
//!
//! Provider and store failures during the creation half of a join abort
//! the join and surface classified. Usage/occupancy accounting during
//! `end` is best-effort: failures are logged and teardown proceeds.
//! Accounting gaps are acceptable; stuck live rooms are not.

use crate::errors::RcError;
use crate::models::{
    EndRequest, JoinRequest, JoinedSession, NewAttendeeRecord, NewMeetingRecord,
    NewOccupancyInterval, NewUsageInterval, ProviderMeeting,
};
use crate::observability::metrics;
use crate::repositories::{MeetingRecordStore, OccupancyLedger, ParticipantUsageTracker};
use crate::services::provider_client::{ConferenceProviderGateway, CreateMeetingRequest};
use chrono::Duration;
use common::types::{ExternalUserId, RoomTitle};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Coordinator settings derived from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Media region used when a join request leaves the region empty.
    pub default_media_region: String,

    /// TTL applied to meeting records.
    pub meeting_record_ttl: Duration,

    /// TTL applied to attendee records.
    pub attendee_record_ttl: Duration,
}

impl CoordinatorSettings {
    /// Derive settings from service configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            default_media_region: config.default_media_region.clone(),
            meeting_record_ttl: Duration::seconds(config.meeting_record_ttl_seconds),
            attendee_record_ttl: Duration::seconds(config.attendee_record_ttl_seconds),
        }
    }
}

/// Sequences meeting creation/reuse, admission, and room teardown.
///
/// Constructed with interface-typed collaborators so tests substitute
/// fakes without process-wide mutation.
pub struct SessionCoordinator {
    provider: Arc<dyn ConferenceProviderGateway>,
    meeting_records: Arc<dyn MeetingRecordStore>,
    occupancy: Arc<dyn OccupancyLedger>,
    usage: Arc<dyn ParticipantUsageTracker>,
    settings: CoordinatorSettings,
}

impl SessionCoordinator {
    /// Create a coordinator.
    pub fn new(
        provider: Arc<dyn ConferenceProviderGateway>,
        meeting_records: Arc<dyn MeetingRecordStore>,
        occupancy: Arc<dyn OccupancyLedger>,
        usage: Arc<dyn ParticipantUsageTracker>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            provider,
            meeting_records,
            occupancy,
            usage,
            settings,
        }
    }

    /// Join a room: reuse the live provider meeting for the title or
    /// create one, then admit the attendee.
    ///
    /// # Errors
    ///
    /// - [`RcError::ProviderBadRequest`] / [`RcError::ProviderUnavailable`]:
    ///   provider rejected or is down; not retried here
    /// - [`RcError::StaleSession`]: the stored record pointed at a deleted
    ///   provider meeting and has been dropped; a retry recreates the room
    /// - [`RcError::Store`]: backing store failure
    #[instrument(
        skip_all,
        name = "rc.session.join",
        fields(title = tracing::field::Empty)
    )]
    pub async fn join(&self, request: JoinRequest) -> Result<JoinedSession, RcError> {
        let start = Instant::now();
        let title = RoomTitle::normalized(&request.title);
        tracing::Span::current().record("title", tracing::field::display(&title));

        if title.is_empty() {
            metrics::record_join("error", Some("provider_bad_request"), start.elapsed());
            return Err(RcError::ProviderBadRequest(
                "room title must not be empty".to_string(),
            ));
        }

        let result = self.join_inner(&title, &request).await;

        match &result {
            Ok(_) => metrics::record_join("success", None, start.elapsed()),
            Err(e) => metrics::record_join("error", Some(e.reason_label()), start.elapsed()),
        }

        result
    }

    async fn join_inner(
        &self,
        title: &RoomTitle,
        request: &JoinRequest,
    ) -> Result<JoinedSession, RcError> {
        let existing = self.meeting_records.get(title).await?;

        let (meeting, reused) = match existing {
            Some(record) => match record.decode_provider_meeting() {
                Ok(meeting) => (meeting, true),
                Err(e) => {
                    // Undecodable record: drop it rather than wedge the
                    // room until the TTL runs out.
                    warn!(
                        target: "rc.services.coordinator",
                        title = %title,
                        error = %e,
                        "Stored meeting record is undecodable, dropping it"
                    );
                    self.meeting_records.delete(title).await?;
                    return Err(RcError::StaleSession(title.to_string()));
                }
            },
            None => (self.create_room(title, request).await?, false),
        };

        let external_user_id = ExternalUserId::new();
        let attendee = match self
            .provider
            .create_attendee(&meeting.meeting_id, &external_user_id)
            .await
        {
            Ok(attendee) => attendee,
            Err(RcError::ProviderMeetingNotFound(_)) => {
                // The record points at a provider meeting that no longer
                // exists. Never admit into a non-existent room: drop the
                // record and have the caller retry into a fresh session.
                warn!(
                    target: "rc.services.coordinator",
                    title = %title,
                    meeting_id = %meeting.meeting_id,
                    "Stored meeting record is stale, dropping it"
                );
                self.meeting_records.delete(title).await?;
                return Err(RcError::StaleSession(title.to_string()));
            }
            Err(e) => return Err(e),
        };

        self.meeting_records
            .put_attendee(NewAttendeeRecord {
                title: title.clone(),
                attendee_id: attendee.attendee_id.clone(),
                display_name: request.attendee_name.clone(),
                ttl: self.settings.attendee_record_ttl,
            })
            .await?;

        // Usage accounting is best-effort; admission never blocks on it.
        if let Err(e) = self
            .usage
            .open_interval(NewUsageInterval {
                title: title.clone(),
                participant_identity: request.attendee_name.clone(),
                user_email: request.user_email.clone(),
            })
            .await
        {
            warn!(
                target: "rc.services.coordinator",
                title = %title,
                participant = %request.attendee_name,
                error = %e,
                "Failed to open participant usage interval"
            );
        }

        info!(
            target: "rc.services.coordinator",
            title = %title,
            meeting_id = %meeting.meeting_id,
            attendee_id = %attendee.attendee_id,
            reused = reused,
            "Attendee admitted"
        );

        Ok(JoinedSession { meeting, attendee })
    }

    /// Create the provider meeting and the paired records for a title with
    /// no live session.
    async fn create_room(
        &self,
        title: &RoomTitle,
        request: &JoinRequest,
    ) -> Result<ProviderMeeting, RcError> {
        let media_region = resolve_media_region(
            request.media_region.as_deref(),
            &self.settings.default_media_region,
        );

        let meeting = self
            .provider
            .create_meeting(&CreateMeetingRequest {
                client_request_token: Uuid::new_v4().to_string(),
                media_region,
                features: request.features.clone(),
            })
            .await?;

        // Meeting record and opening occupancy interval land in one
        // transaction: a concurrent reader never observes one without
        // the other.
        self.meeting_records
            .create_room(
                NewMeetingRecord {
                    title: title.clone(),
                    provider_meeting: meeting.to_blob()?,
                    ttl: self.settings.meeting_record_ttl,
                },
                NewOccupancyInterval {
                    team_id: request.team_id.clone(),
                    title: title.clone(),
                    attendee_name: request.attendee_name.clone(),
                    user_email: request.user_email.clone(),
                },
            )
            .await?;

        info!(
            target: "rc.services.coordinator",
            title = %title,
            meeting_id = %meeting.meeting_id,
            "Room created"
        );

        Ok(meeting)
    }

    /// End a participant's session in a room; with termination authority,
    /// tear the whole room down.
    ///
    /// The caller's own usage interval is always closed (best-effort).
    /// With authority asserted: the provider meeting is deleted
    /// (idempotent: an already-deleted meeting is success), the meeting
    /// record is removed, and the room's open occupancy interval is
    /// closed. Without authority the room stays live for the others.
    #[instrument(
        skip_all,
        name = "rc.session.end",
        fields(title = tracing::field::Empty, authority = request.termination_authority)
    )]
    pub async fn end(&self, request: EndRequest) -> Result<(), RcError> {
        let start = Instant::now();
        let title = RoomTitle::normalized(&request.title);
        tracing::Span::current().record("title", tracing::field::display(&title));

        if title.is_empty() {
            metrics::record_end("error", start.elapsed());
            return Err(RcError::ProviderBadRequest(
                "room title must not be empty".to_string(),
            ));
        }

        let result = self.end_inner(&title, &request).await;

        match &result {
            Ok(()) => metrics::record_end("success", start.elapsed()),
            Err(_) => metrics::record_end("error", start.elapsed()),
        }

        result
    }

    async fn end_inner(&self, title: &RoomTitle, request: &EndRequest) -> Result<(), RcError> {
        // 1. Always close the caller's own usage interval. Accounting
        //    must never block a user from leaving.
        match self
            .usage
            .close_latest_open_for_participant(title, &request.participant_name)
            .await
        {
            Ok(Some(record)) => debug!(
                target: "rc.services.coordinator",
                title = %title,
                participant = %request.participant_name,
                started_at = %record.started_at,
                "Closed participant usage interval"
            ),
            Ok(None) => {}
            Err(e) => warn!(
                target: "rc.services.coordinator",
                title = %title,
                participant = %request.participant_name,
                error = %e,
                "Failed to close participant usage interval, continuing teardown"
            ),
        }

        if !request.termination_authority {
            info!(
                target: "rc.services.coordinator",
                title = %title,
                participant = %request.participant_name,
                "Participant left, room remains live"
            );
            return Ok(());
        }

        // 2. Tear the room down. Provider deletion is idempotent; a
        //    provider outage here must not leave the room stuck live, so
        //    only record-store failures surface.
        match self.meeting_records.get(title).await? {
            Some(record) => {
                match record.decode_provider_meeting() {
                    Ok(meeting) => match self.provider.delete_meeting(&meeting.meeting_id).await {
                        Ok(()) => {}
                        Err(RcError::ProviderMeetingNotFound(_)) => debug!(
                            target: "rc.services.coordinator",
                            title = %title,
                            meeting_id = %meeting.meeting_id,
                            "Provider meeting already deleted"
                        ),
                        Err(e) => warn!(
                            target: "rc.services.coordinator",
                            title = %title,
                            meeting_id = %meeting.meeting_id,
                            error = %e,
                            "Provider meeting deletion failed, continuing teardown"
                        ),
                    },
                    Err(e) => warn!(
                        target: "rc.services.coordinator",
                        title = %title,
                        error = %e,
                        "Stored meeting record is undecodable, skipping provider deletion"
                    ),
                }

                self.meeting_records.delete(title).await?;
            }
            None => debug!(
                target: "rc.services.coordinator",
                title = %title,
                "No live meeting record, nothing to delete"
            ),
        }

        // 3. Close the room's occupancy interval (best-effort accounting).
        if let Err(e) = self.occupancy.close_latest_open_for_room(title).await {
            warn!(
                target: "rc.services.coordinator",
                title = %title,
                error = %e,
                "Failed to close room occupancy interval"
            );
        }

        info!(
            target: "rc.services.coordinator",
            title = %title,
            "Room ended"
        );

        Ok(())
    }

    /// Resolve an admitted attendee back to a display name.
    #[instrument(skip_all, name = "rc.session.attendee_name")]
    pub async fn attendee_name(
        &self,
        title: &str,
        attendee_id: &str,
    ) -> Result<Option<String>, RcError> {
        let title = RoomTitle::normalized(title);
        let record = self.meeting_records.get_attendee(&title, attendee_id).await?;
        Ok(record.map(|record| record.display_name))
    }
}

/// Pick the media region for a new meeting: the request's, unless empty.
fn resolve_media_region(requested: Option<&str>, default: &str) -> String {
    match requested {
        Some(region) if !region.trim().is_empty() => region.to_string(),
        _ => default.to_string(),
    }
}
