//! Participant-level usage tracker.
//!
//! Append-only intervals scoped by room title **and** participant
//! identity. A room can have several participants with independently open
//! intervals, so the close path must never select "the newest record for
//! this title" alone: it matches on identity as well, or an unrelated,
//! still-active participant's interval would be silently terminated.
//!
//! Deliberately a separate operation from the room-level close in
//! [`crate::repositories::occupancy`] so the identity filter cannot be
//! dropped in a refactor.

use crate::errors::RcError;
use crate::models::{NewUsageInterval, ParticipantUsageRecord};
use crate::observability::metrics;
use async_trait::async_trait;
use common::types::RoomTitle;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::{debug, instrument};

/// Tracker of per-participant usage intervals.
#[async_trait]
pub trait ParticipantUsageTracker: Send + Sync {
    /// Append an open usage interval for a participant in a room.
    async fn open_interval(
        &self,
        interval: NewUsageInterval,
    ) -> Result<ParticipantUsageRecord, RcError>;

    /// Close the newest open interval matching both title and identity.
    ///
    /// Returns `Ok(None)` without error when no interval matches:
    /// duplicate end events and participants who never opened a tracked
    /// interval are valid, non-error conditions.
    async fn close_latest_open_for_participant(
        &self,
        title: &RoomTitle,
        participant_identity: &str,
    ) -> Result<Option<ParticipantUsageRecord>, RcError>;
}

/// Postgres-backed participant usage tracker.
#[derive(Clone)]
pub struct PgParticipantUsageTracker {
    pool: PgPool,
}

impl PgParticipantUsageTracker {
    /// Create a tracker over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Columns selected for every usage query.
const USAGE_COLUMNS: &str = r#"
    usage_id, title, participant_identity, user_email, started_at, ended_at
"#;

/// Map a database row to a `ParticipantUsageRecord`.
fn map_row_to_usage(row: &PgRow) -> ParticipantUsageRecord {
    ParticipantUsageRecord {
        usage_id: row.get("usage_id"),
        title: RoomTitle::normalized(row.get("title")),
        participant_identity: row.get("participant_identity"),
        user_email: row.get("user_email"),
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
    }
}

#[async_trait]
impl ParticipantUsageTracker for PgParticipantUsageTracker {
    #[instrument(skip_all, name = "rc.repo.open_usage_interval", fields(title = %interval.title))]
    async fn open_interval(
        &self,
        interval: NewUsageInterval,
    ) -> Result<ParticipantUsageRecord, RcError> {
        let start = Instant::now();

        let query = format!(
            r#"
            INSERT INTO participant_usage_records (title, participant_identity, user_email)
            VALUES ($1, $2, $3)
            RETURNING {USAGE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(interval.title.as_str())
            .bind(&interval.participant_identity)
            .bind(&interval.user_email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("open_usage_interval", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("open_usage_interval", "success", start.elapsed());

        Ok(map_row_to_usage(&row))
    }

    #[instrument(
        skip_all,
        name = "rc.repo.close_participant_interval",
        fields(title = %title, participant = %participant_identity)
    )]
    async fn close_latest_open_for_participant(
        &self,
        title: &RoomTitle,
        participant_identity: &str,
    ) -> Result<Option<ParticipantUsageRecord>, RcError> {
        let start = Instant::now();

        // The inner predicate matches on identity as well as title.
        let query = format!(
            r#"
            UPDATE participant_usage_records
            SET ended_at = NOW()
            WHERE usage_id = (
                SELECT usage_id
                FROM participant_usage_records
                WHERE title = $1
                  AND participant_identity = $2
                  AND ended_at IS NULL
                ORDER BY started_at DESC
                LIMIT 1
            )
            RETURNING {USAGE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(title.as_str())
            .bind(participant_identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("close_participant_interval", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("close_participant_interval", "success", start.elapsed());

        match row {
            Some(row) => Ok(Some(map_row_to_usage(&row))),
            None => {
                debug!(
                    target: "rc.repo.participant_usage",
                    title = %title,
                    participant = %participant_identity,
                    "No matching open usage interval to close"
                );
                Ok(None)
            }
        }
    }
}
