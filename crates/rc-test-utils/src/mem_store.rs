//! In-memory store implementing all three store traits.
//!
//! Backs coordinator tests without a database. Semantics mirror the
//! Postgres repositories:
//!
//! - expired meeting/attendee records read as absent but stay in the map
//! - `create_room` writes the meeting record and opening interval under
//!   one lock (the in-memory stand-in for the transaction)
//! - interval vectors are append-only; reverse insertion order stands in
//!   for `ORDER BY started_at DESC`
//!
//! Failure switches let tests drive the best-effort accounting paths.

use async_trait::async_trait;
use chrono::Utc;
use common::types::RoomTitle;
use rc_service::errors::RcError;
use rc_service::models::{
    AttendeeRecord, IntervalStatus, MeetingRecord, NewAttendeeRecord, NewMeetingRecord,
    NewOccupancyInterval, NewUsageInterval, OccupancyRecord, ParticipantUsageRecord,
};
use rc_service::repositories::{MeetingRecordStore, OccupancyLedger, ParticipantUsageTracker};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Default)]
struct MemStoreInner {
    meetings: HashMap<String, MeetingRecord>,
    attendees: HashMap<(String, String), AttendeeRecord>,
    occupancy: Vec<OccupancyRecord>,
    usage: Vec<ParticipantUsageRecord>,
    fail_usage: bool,
    fail_occupancy_close: bool,
    fail_record_delete: bool,
}

/// In-memory store for coordinator tests.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<MemStoreInner>>,
}

impl MemStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every participant-usage operation fail until reset.
    pub fn set_fail_usage(&self, fail: bool) {
        self.inner.lock().unwrap().fail_usage = fail;
    }

    /// Make the room-level close fail until reset.
    pub fn set_fail_occupancy_close(&self, fail: bool) {
        self.inner.lock().unwrap().fail_occupancy_close = fail;
    }

    /// Make meeting-record deletion fail until reset.
    pub fn set_fail_record_delete(&self, fail: bool) {
        self.inner.lock().unwrap().fail_record_delete = fail;
    }

    /// Raw meeting record for a title, ignoring logical expiry.
    #[must_use]
    pub fn raw_meeting_record(&self, title: &RoomTitle) -> Option<MeetingRecord> {
        self.inner
            .lock()
            .unwrap()
            .meetings
            .get(title.as_str())
            .cloned()
    }

    /// All occupancy records for a title, in insertion (start) order.
    #[must_use]
    pub fn occupancy_records(&self, title: &RoomTitle) -> Vec<OccupancyRecord> {
        self.inner
            .lock()
            .unwrap()
            .occupancy
            .iter()
            .filter(|r| r.title == *title)
            .cloned()
            .collect()
    }

    /// All usage records for a title, in insertion (start) order.
    #[must_use]
    pub fn usage_records(&self, title: &RoomTitle) -> Vec<ParticipantUsageRecord> {
        self.inner
            .lock()
            .unwrap()
            .usage
            .iter()
            .filter(|r| r.title == *title)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MeetingRecordStore for MemStore {
    async fn get(&self, title: &RoomTitle) -> Result<Option<MeetingRecord>, RcError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .meetings
            .get(title.as_str())
            .filter(|record| record.expires_at > Utc::now())
            .cloned())
    }

    async fn create_room(
        &self,
        meeting: NewMeetingRecord,
        opening: NewOccupancyInterval,
    ) -> Result<(), RcError> {
        let mut inner = self.inner.lock().unwrap();

        // Both writes happen under one lock, like the real transaction.
        inner.meetings.insert(
            meeting.title.as_str().to_string(),
            MeetingRecord {
                title: meeting.title.clone(),
                provider_meeting: meeting.provider_meeting,
                expires_at: Utc::now() + meeting.ttl,
            },
        );

        inner.occupancy.push(OccupancyRecord {
            occupancy_id: Uuid::new_v4(),
            team_id: opening.team_id,
            title: opening.title,
            attendee_name: opening.attendee_name,
            user_email: opening.user_email,
            started_at: Utc::now(),
            ended_at: None,
            status: IntervalStatus::Open,
        });

        Ok(())
    }

    async fn delete(&self, title: &RoomTitle) -> Result<(), RcError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_record_delete {
            return Err(RcError::Store("mem store: delete disabled".to_string()));
        }
        inner.meetings.remove(title.as_str());
        Ok(())
    }

    async fn put_attendee(&self, attendee: NewAttendeeRecord) -> Result<(), RcError> {
        let mut inner = self.inner.lock().unwrap();
        inner.attendees.insert(
            (
                attendee.title.as_str().to_string(),
                attendee.attendee_id.clone(),
            ),
            AttendeeRecord {
                title: attendee.title,
                attendee_id: attendee.attendee_id,
                display_name: attendee.display_name,
                expires_at: Utc::now() + attendee.ttl,
            },
        );
        Ok(())
    }

    async fn get_attendee(
        &self,
        title: &RoomTitle,
        attendee_id: &str,
    ) -> Result<Option<AttendeeRecord>, RcError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendees
            .get(&(title.as_str().to_string(), attendee_id.to_string()))
            .filter(|record| record.expires_at > Utc::now())
            .cloned())
    }
}

#[async_trait]
impl OccupancyLedger for MemStore {
    async fn open_interval(
        &self,
        interval: NewOccupancyInterval,
    ) -> Result<OccupancyRecord, RcError> {
        let mut inner = self.inner.lock().unwrap();
        let record = OccupancyRecord {
            occupancy_id: Uuid::new_v4(),
            team_id: interval.team_id,
            title: interval.title,
            attendee_name: interval.attendee_name,
            user_email: interval.user_email,
            started_at: Utc::now(),
            ended_at: None,
            status: IntervalStatus::Open,
        };
        inner.occupancy.push(record.clone());
        Ok(record)
    }

    async fn latest_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .occupancy
            .iter()
            .rev()
            .find(|r| r.title == *title)
            .cloned())
    }

    async fn close_latest_open_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_occupancy_close {
            return Err(RcError::Store(
                "mem store: occupancy close disabled".to_string(),
            ));
        }

        let record = inner
            .occupancy
            .iter_mut()
            .rev()
            .find(|r| r.title == *title && r.status == IntervalStatus::Open);

        match record {
            Some(record) => {
                record.ended_at = Some(Utc::now());
                record.status = IntervalStatus::Closed;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ParticipantUsageTracker for MemStore {
    async fn open_interval(
        &self,
        interval: NewUsageInterval,
    ) -> Result<ParticipantUsageRecord, RcError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_usage {
            return Err(RcError::Store("mem store: usage disabled".to_string()));
        }

        let record = ParticipantUsageRecord {
            usage_id: Uuid::new_v4(),
            title: interval.title,
            participant_identity: interval.participant_identity,
            user_email: interval.user_email,
            started_at: Utc::now(),
            ended_at: None,
        };
        inner.usage.push(record.clone());
        Ok(record)
    }

    async fn close_latest_open_for_participant(
        &self,
        title: &RoomTitle,
        participant_identity: &str,
    ) -> Result<Option<ParticipantUsageRecord>, RcError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_usage {
            return Err(RcError::Store("mem store: usage disabled".to_string()));
        }

        // Newest-first scan; must match on identity as well as title.
        let record = inner
            .usage
            .iter_mut()
            .rev()
            .find(|r| r.title == *title && r.participant_identity == participant_identity && r.ended_at.is_none());

        match record {
            Some(record) => {
                record.ended_at = Some(Utc::now());
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }
}
