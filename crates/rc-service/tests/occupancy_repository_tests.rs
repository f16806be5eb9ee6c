//! Occupancy ledger integration tests.
//!
//! Tests room-level interval bookkeeping against isolated test databases.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use common::types::{RoomTitle, TeamId};
use rc_service::models::{IntervalStatus, NewOccupancyInterval};
use rc_service::repositories::{OccupancyLedger, PgOccupancyLedger};
use sqlx::PgPool;

fn interval(title: &str, attendee: &str) -> NewOccupancyInterval {
    NewOccupancyInterval {
        team_id: TeamId::new("team-42"),
        title: RoomTitle::normalized(title),
        attendee_name: attendee.to_string(),
        user_email: format!("{}@example.com", attendee.to_lowercase()),
    }
}

/// Test that open_interval inserts an open record with no end timestamp.
#[sqlx::test(migrations = "../../migrations")]
async fn test_open_interval(pool: PgPool) -> Result<(), anyhow::Error> {
    let ledger = PgOccupancyLedger::new(pool);

    let record = ledger.open_interval(interval("standup-1", "Alice")).await?;

    assert_eq!(record.status, IntervalStatus::Open);
    assert!(record.ended_at.is_none());
    assert_eq!(record.attendee_name, "Alice");
    assert_eq!(record.team_id.as_str(), "team-42");
    assert_eq!(record.title, RoomTitle::normalized("standup-1"));

    Ok(())
}

/// Test that latest_for_room returns None for an unknown room and the
/// newest record otherwise.
#[sqlx::test(migrations = "../../migrations")]
async fn test_latest_for_room(pool: PgPool) -> Result<(), anyhow::Error> {
    let ledger = PgOccupancyLedger::new(pool);
    let title = RoomTitle::normalized("standup-1");

    assert!(ledger.latest_for_room(&title).await?.is_none());

    ledger.open_interval(interval("standup-1", "Alice")).await?;
    let second = ledger.open_interval(interval("standup-1", "Bob")).await?;

    let latest = ledger
        .latest_for_room(&title)
        .await?
        .expect("latest should exist");
    assert_eq!(latest.occupancy_id, second.occupancy_id);

    // Other rooms do not leak in.
    ledger.open_interval(interval("standup-2", "Carol")).await?;
    let latest = ledger
        .latest_for_room(&title)
        .await?
        .expect("latest should exist");
    assert_eq!(latest.attendee_name, "Bob");

    Ok(())
}

/// Test that close on a room with zero records is a quiet no-op.
#[sqlx::test(migrations = "../../migrations")]
async fn test_close_on_empty_room_is_noop(pool: PgPool) -> Result<(), anyhow::Error> {
    let ledger = PgOccupancyLedger::new(pool);

    let closed = ledger
        .close_latest_open_for_room(&RoomTitle::normalized("never-used"))
        .await?;
    assert!(closed.is_none());

    Ok(())
}

/// Test that close stamps the newest open interval and a repeat close is
/// a no-op.
#[sqlx::test(migrations = "../../migrations")]
async fn test_close_then_repeat_close(pool: PgPool) -> Result<(), anyhow::Error> {
    let ledger = PgOccupancyLedger::new(pool);
    let title = RoomTitle::normalized("standup-1");

    let opened = ledger.open_interval(interval("standup-1", "Alice")).await?;

    let closed = ledger
        .close_latest_open_for_room(&title)
        .await?
        .expect("open interval should close");
    assert_eq!(closed.occupancy_id, opened.occupancy_id);
    assert_eq!(closed.status, IntervalStatus::Closed);
    assert!(closed.ended_at.is_some());

    // Already closed: nothing to do, no error.
    let again = ledger.close_latest_open_for_room(&title).await?;
    assert!(again.is_none());

    Ok(())
}

/// Test that close after a reopen targets the new open interval, not the
/// closed history.
#[sqlx::test(migrations = "../../migrations")]
async fn test_close_targets_open_interval_after_reopen(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let ledger = PgOccupancyLedger::new(pool);
    let title = RoomTitle::normalized("standup-1");

    ledger.open_interval(interval("standup-1", "Alice")).await?;
    ledger.close_latest_open_for_room(&title).await?;

    let reopened = ledger.open_interval(interval("standup-1", "Bob")).await?;
    let closed = ledger
        .close_latest_open_for_room(&title)
        .await?
        .expect("reopened interval should close");

    assert_eq!(closed.occupancy_id, reopened.occupancy_id);
    assert_eq!(closed.attendee_name, "Bob");

    Ok(())
}
