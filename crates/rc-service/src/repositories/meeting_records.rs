//! Meeting record store: live-session records and attendee records.
//!
//! A meeting record marks a room title as having a live provider meeting;
//! attendee records resolve provider attendee ids back to display names.
//! Both carry a logical `expires_at`: every read treats an expired row as
//! absent, and [`PgMeetingRecordStore::purge_expired`] removes expired
//! rows physically (driven by the background sweeper).

use crate::errors::RcError;
use crate::models::{
    AttendeeRecord, MeetingRecord, NewAttendeeRecord, NewMeetingRecord, NewOccupancyInterval,
};
use crate::observability::metrics;
use crate::repositories::occupancy;
use async_trait::async_trait;
use chrono::Utc;
use common::types::RoomTitle;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::{debug, instrument};

/// Store for meeting and attendee records.
#[async_trait]
pub trait MeetingRecordStore: Send + Sync {
    /// Look up the live meeting record for a title.
    ///
    /// A record whose `expires_at` has passed reads as absent even while
    /// physically present.
    async fn get(&self, title: &RoomTitle) -> Result<Option<MeetingRecord>, RcError>;

    /// Create a room: write the meeting record and its opening occupancy
    /// interval in a single transaction.
    ///
    /// The meeting write is last-writer-wins: concurrent first-joins for
    /// the same title race benignly, and no reader ever observes a meeting
    /// record without a corresponding open interval.
    async fn create_room(
        &self,
        meeting: NewMeetingRecord,
        opening: NewOccupancyInterval,
    ) -> Result<(), RcError>;

    /// Delete the meeting record for a title. Idempotent no-op if absent.
    async fn delete(&self, title: &RoomTitle) -> Result<(), RcError>;

    /// Persist an attendee record for an admitted attendee.
    async fn put_attendee(&self, attendee: NewAttendeeRecord) -> Result<(), RcError>;

    /// Resolve an attendee record by (title, provider attendee id).
    async fn get_attendee(
        &self,
        title: &RoomTitle,
        attendee_id: &str,
    ) -> Result<Option<AttendeeRecord>, RcError>;
}

/// Postgres-backed meeting record store.
#[derive(Clone)]
pub struct PgMeetingRecordStore {
    pool: PgPool,
}

impl PgMeetingRecordStore {
    /// Create a store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Physically remove expired meeting and attendee rows.
    ///
    /// Reads never depend on this: logical expiry is part of every query.
    /// Returns the number of rows removed.
    #[instrument(skip_all, name = "rc.repo.purge_expired")]
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, RcError> {
        let start = Instant::now();

        let result = async {
            let meetings = sqlx::query("DELETE FROM meeting_records WHERE expires_at <= NOW()")
                .execute(pool)
                .await?;
            let attendees = sqlx::query("DELETE FROM attendee_records WHERE expires_at <= NOW()")
                .execute(pool)
                .await?;
            Ok::<u64, sqlx::Error>(meetings.rows_affected() + attendees.rows_affected())
        }
        .await;

        match result {
            Ok(purged) => {
                metrics::record_db_query("purge_expired", "success", start.elapsed());
                Ok(purged)
            }
            Err(e) => {
                metrics::record_db_query("purge_expired", "error", start.elapsed());
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl MeetingRecordStore for PgMeetingRecordStore {
    #[instrument(skip_all, name = "rc.repo.get_meeting_record", fields(title = %title))]
    async fn get(&self, title: &RoomTitle) -> Result<Option<MeetingRecord>, RcError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            SELECT title, provider_meeting, expires_at
            FROM meeting_records
            WHERE title = $1 AND expires_at > NOW()
            "#,
        )
        .bind(title.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("get_meeting_record", "error", start.elapsed());
            RcError::from(e)
        })?;

        metrics::record_db_query("get_meeting_record", "success", start.elapsed());

        Ok(row.map(|row| MeetingRecord {
            title: RoomTitle::normalized(row.get("title")),
            provider_meeting: row.get("provider_meeting"),
            expires_at: row.get("expires_at"),
        }))
    }

    #[instrument(skip_all, name = "rc.repo.create_room", fields(title = %meeting.title))]
    async fn create_room(
        &self,
        meeting: NewMeetingRecord,
        opening: NewOccupancyInterval,
    ) -> Result<(), RcError> {
        let start = Instant::now();
        let expires_at = Utc::now() + meeting.ttl;

        let result = async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                r#"
                INSERT INTO meeting_records (title, provider_meeting, expires_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (title) DO UPDATE SET
                    provider_meeting = EXCLUDED.provider_meeting,
                    expires_at = EXCLUDED.expires_at,
                    updated_at = NOW()
                "#,
            )
            .bind(meeting.title.as_str())
            .bind(&meeting.provider_meeting)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;

            occupancy::insert_open_interval(&mut *tx, &opening).await?;

            tx.commit().await?;
            Ok::<(), sqlx::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                metrics::record_db_query("create_room", "success", start.elapsed());
                debug!(
                    target: "rc.repo.meeting_records",
                    title = %meeting.title,
                    "Room created: meeting record and opening interval written"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_db_query("create_room", "error", start.elapsed());
                Err(e.into())
            }
        }
    }

    #[instrument(skip_all, name = "rc.repo.delete_meeting_record", fields(title = %title))]
    async fn delete(&self, title: &RoomTitle) -> Result<(), RcError> {
        let start = Instant::now();

        let result = sqlx::query("DELETE FROM meeting_records WHERE title = $1")
            .bind(title.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("delete_meeting_record", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("delete_meeting_record", "success", start.elapsed());

        if result.rows_affected() == 0 {
            debug!(
                target: "rc.repo.meeting_records",
                title = %title,
                "Delete of absent meeting record (no-op)"
            );
        }

        Ok(())
    }

    #[instrument(skip_all, name = "rc.repo.put_attendee_record", fields(title = %attendee.title))]
    async fn put_attendee(&self, attendee: NewAttendeeRecord) -> Result<(), RcError> {
        let start = Instant::now();
        let expires_at = Utc::now() + attendee.ttl;

        sqlx::query(
            r#"
            INSERT INTO attendee_records (title, attendee_id, display_name, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (title, attendee_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(attendee.title.as_str())
        .bind(&attendee.attendee_id)
        .bind(&attendee.display_name)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("put_attendee_record", "error", start.elapsed());
            RcError::from(e)
        })?;

        metrics::record_db_query("put_attendee_record", "success", start.elapsed());

        Ok(())
    }

    #[instrument(skip_all, name = "rc.repo.get_attendee_record", fields(title = %title))]
    async fn get_attendee(
        &self,
        title: &RoomTitle,
        attendee_id: &str,
    ) -> Result<Option<AttendeeRecord>, RcError> {
        let start = Instant::now();

        let row = sqlx::query(
            r#"
            SELECT title, attendee_id, display_name, expires_at
            FROM attendee_records
            WHERE title = $1 AND attendee_id = $2 AND expires_at > NOW()
            "#,
        )
        .bind(title.as_str())
        .bind(attendee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("get_attendee_record", "error", start.elapsed());
            RcError::from(e)
        })?;

        metrics::record_db_query("get_attendee_record", "success", start.elapsed());

        Ok(row.map(|row| AttendeeRecord {
            title: RoomTitle::normalized(row.get("title")),
            attendee_id: row.get("attendee_id"),
            display_name: row.get("display_name"),
            expires_at: row.get("expires_at"),
        }))
    }
}
