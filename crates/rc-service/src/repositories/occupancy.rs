//! Room-level occupancy ledger.
//!
//! Append-only intervals describing when a room was in use, one open
//! interval per active occupancy window. The close path targets the
//! newest **open** interval for a title; an absent or already-closed
//! interval is a logged no-op, never an error.
//!
//! The lookup here is keyed only by title: the room-level ledger tracks
//! room-wide start/end, not per-attendee occupancy, and has at most one
//! open interval under normal operation. Per-participant intervals live
//! in [`crate::repositories::participant_usage`], whose close must also
//! match on identity.

use crate::errors::RcError;
use crate::models::{IntervalStatus, NewOccupancyInterval, OccupancyRecord};
use crate::observability::metrics;
use async_trait::async_trait;
use common::types::{RoomTitle, TeamId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::time::Instant;
use tracing::{debug, instrument};

/// Ledger of room-level occupancy intervals.
#[async_trait]
pub trait OccupancyLedger: Send + Sync {
    /// Append an open interval for a room.
    async fn open_interval(
        &self,
        interval: NewOccupancyInterval,
    ) -> Result<OccupancyRecord, RcError>;

    /// Newest interval for a room regardless of status.
    async fn latest_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError>;

    /// Close the newest open interval for a room.
    ///
    /// Returns `Ok(None)` without error when the room has no open
    /// interval (never occupied, or already closed).
    async fn close_latest_open_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError>;
}

/// Postgres-backed occupancy ledger.
#[derive(Clone)]
pub struct PgOccupancyLedger {
    pool: PgPool,
}

impl PgOccupancyLedger {
    /// Create a ledger over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Columns selected for every occupancy query.
const OCCUPANCY_COLUMNS: &str = r#"
    occupancy_id, team_id, title, attendee_name, user_email,
    started_at, ended_at, status
"#;

/// Insert an open interval through any Postgres executor.
///
/// Shared with the meeting record store, which writes the opening
/// interval inside the room-creation transaction. All occupancy SQL
/// stays in this module.
pub(crate) async fn insert_open_interval<'e, E>(
    executor: E,
    interval: &NewOccupancyInterval,
) -> Result<OccupancyRecord, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let query = format!(
        r#"
        INSERT INTO occupancy_records (team_id, title, attendee_name, user_email, status)
        VALUES ($1, $2, $3, $4, 'open')
        RETURNING {OCCUPANCY_COLUMNS}
        "#
    );

    let row = sqlx::query(&query)
        .bind(interval.team_id.as_str())
        .bind(interval.title.as_str())
        .bind(&interval.attendee_name)
        .bind(&interval.user_email)
        .fetch_one(executor)
        .await?;

    Ok(map_row_to_occupancy(&row))
}

/// Map a database row to an `OccupancyRecord`.
fn map_row_to_occupancy(row: &PgRow) -> OccupancyRecord {
    OccupancyRecord {
        occupancy_id: row.get("occupancy_id"),
        team_id: TeamId::new(row.get::<String, _>("team_id")),
        title: RoomTitle::normalized(row.get("title")),
        attendee_name: row.get("attendee_name"),
        user_email: row.get("user_email"),
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
        status: IntervalStatus::from_db_str(row.get("status")),
    }
}

#[async_trait]
impl OccupancyLedger for PgOccupancyLedger {
    #[instrument(skip_all, name = "rc.repo.open_occupancy_interval", fields(title = %interval.title))]
    async fn open_interval(
        &self,
        interval: NewOccupancyInterval,
    ) -> Result<OccupancyRecord, RcError> {
        let start = Instant::now();

        let record = insert_open_interval(&self.pool, &interval)
            .await
            .map_err(|e| {
                metrics::record_db_query("open_occupancy_interval", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("open_occupancy_interval", "success", start.elapsed());

        Ok(record)
    }

    #[instrument(skip_all, name = "rc.repo.latest_room_interval", fields(title = %title))]
    async fn latest_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError> {
        let start = Instant::now();

        let query = format!(
            r#"
            SELECT {OCCUPANCY_COLUMNS}
            FROM occupancy_records
            WHERE title = $1
            ORDER BY started_at DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query(&query)
            .bind(title.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("latest_room_interval", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("latest_room_interval", "success", start.elapsed());

        Ok(row.as_ref().map(map_row_to_occupancy))
    }

    #[instrument(skip_all, name = "rc.repo.close_room_interval", fields(title = %title))]
    async fn close_latest_open_for_room(
        &self,
        title: &RoomTitle,
    ) -> Result<Option<OccupancyRecord>, RcError> {
        let start = Instant::now();

        let query = format!(
            r#"
            UPDATE occupancy_records
            SET ended_at = NOW(), status = 'closed'
            WHERE occupancy_id = (
                SELECT occupancy_id
                FROM occupancy_records
                WHERE title = $1 AND status = 'open'
                ORDER BY started_at DESC
                LIMIT 1
            )
            RETURNING {OCCUPANCY_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(title.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                metrics::record_db_query("close_room_interval", "error", start.elapsed());
                RcError::from(e)
            })?;

        metrics::record_db_query("close_room_interval", "success", start.elapsed());

        match row {
            Some(row) => Ok(Some(map_row_to_occupancy(&row))),
            None => {
                debug!(
                    target: "rc.repo.occupancy",
                    title = %title,
                    "No open occupancy interval to close (never occupied, or already closed)"
                );
                Ok(None)
            }
        }
    }
}
