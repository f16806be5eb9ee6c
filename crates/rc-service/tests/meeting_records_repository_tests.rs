//! Meeting record repository integration tests.
//!
//! Tests database operations for the meeting_records and attendee_records
//! tables using `#[sqlx::test]` for isolated test databases.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use common::types::{RoomTitle, TeamId};
use rc_service::models::{
    IntervalStatus, NewAttendeeRecord, NewMeetingRecord, NewOccupancyInterval,
};
use rc_service::repositories::{
    MeetingRecordStore, OccupancyLedger, PgMeetingRecordStore, PgOccupancyLedger,
};
use sqlx::PgPool;

fn new_record(title: &str, meeting_id: &str, ttl: Duration) -> NewMeetingRecord {
    let blob = serde_json::to_vec(&serde_json::json!({"meeting_id": meeting_id})).unwrap();
    NewMeetingRecord {
        title: RoomTitle::normalized(title),
        provider_meeting: blob,
        ttl,
    }
}

fn opening(title: &str, attendee: &str) -> NewOccupancyInterval {
    NewOccupancyInterval {
        team_id: TeamId::new("team-42"),
        title: RoomTitle::normalized(title),
        attendee_name: attendee.to_string(),
        user_email: format!("{}@example.com", attendee.to_lowercase()),
    }
}

/// Test that get returns None for a title with no record.
#[sqlx::test(migrations = "../../migrations")]
async fn test_get_absent_title(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool);

    let record = store.get(&RoomTitle::normalized("standup-1")).await?;
    assert!(record.is_none());

    Ok(())
}

/// Test that create_room writes the record and its opening interval
/// together, and the stored blob round-trips.
#[sqlx::test(migrations = "../../migrations")]
async fn test_create_room_writes_record_and_opening_interval(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool.clone());
    let ledger = PgOccupancyLedger::new(pool);
    let title = RoomTitle::normalized("standup-1");

    store
        .create_room(
            new_record("standup-1", "m-001", Duration::hours(1)),
            opening("standup-1", "Alice"),
        )
        .await?;

    let record = store.get(&title).await?.expect("record should be live");
    let meeting = record.decode_provider_meeting()?;
    assert_eq!(meeting.meeting_id, "m-001");
    assert!(record.expires_at > Utc::now());

    let interval = ledger
        .latest_for_room(&title)
        .await?
        .expect("opening interval should exist");
    assert_eq!(interval.status, IntervalStatus::Open);
    assert_eq!(interval.attendee_name, "Alice");
    assert!(interval.ended_at.is_none());

    Ok(())
}

/// Test that an expired record reads as absent even while physically
/// present.
#[sqlx::test(migrations = "../../migrations")]
async fn test_get_treats_expired_record_as_absent(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool.clone());
    let title = RoomTitle::normalized("standup-1");

    store
        .create_room(
            new_record("standup-1", "m-001", Duration::seconds(-10)),
            opening("standup-1", "Alice"),
        )
        .await?;

    assert!(store.get(&title).await?.is_none());

    // The row is still physically there until the sweeper runs.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meeting_records WHERE title = $1")
        .bind(title.as_str())
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

/// Test that a second create_room for the same title wins (last writer)
/// and appends another interval.
#[sqlx::test(migrations = "../../migrations")]
async fn test_create_room_is_last_writer_wins(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool.clone());
    let title = RoomTitle::normalized("standup-1");

    store
        .create_room(
            new_record("standup-1", "m-001", Duration::hours(1)),
            opening("standup-1", "Alice"),
        )
        .await?;
    store
        .create_room(
            new_record("standup-1", "m-002", Duration::hours(1)),
            opening("standup-1", "Bob"),
        )
        .await?;

    let record = store.get(&title).await?.expect("record should be live");
    assert_eq!(record.decode_provider_meeting()?.meeting_id, "m-002");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM occupancy_records WHERE title = $1")
            .bind(title.as_str())
            .fetch_one(&pool)
            .await?;
    assert_eq!(count, 2);

    Ok(())
}

/// Test that delete removes the record and is an idempotent no-op when
/// the record is absent.
#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_is_idempotent(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool);
    let title = RoomTitle::normalized("standup-1");

    // Deleting an absent record must not fail.
    store.delete(&title).await?;

    store
        .create_room(
            new_record("standup-1", "m-001", Duration::hours(1)),
            opening("standup-1", "Alice"),
        )
        .await?;
    store.delete(&title).await?;
    assert!(store.get(&title).await?.is_none());

    // And again.
    store.delete(&title).await?;

    Ok(())
}

/// Test attendee record round-trip and upsert.
#[sqlx::test(migrations = "../../migrations")]
async fn test_attendee_record_round_trip(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool);
    let title = RoomTitle::normalized("standup-1");

    store
        .put_attendee(NewAttendeeRecord {
            title: title.clone(),
            attendee_id: "a-1".to_string(),
            display_name: "Alice".to_string(),
            ttl: Duration::hours(1),
        })
        .await?;

    let record = store
        .get_attendee(&title, "a-1")
        .await?
        .expect("attendee should resolve");
    assert_eq!(record.display_name, "Alice");

    // Upsert replaces the display name.
    store
        .put_attendee(NewAttendeeRecord {
            title: title.clone(),
            attendee_id: "a-1".to_string(),
            display_name: "Alice Anderson".to_string(),
            ttl: Duration::hours(1),
        })
        .await?;
    let record = store
        .get_attendee(&title, "a-1")
        .await?
        .expect("attendee should resolve");
    assert_eq!(record.display_name, "Alice Anderson");

    assert!(store.get_attendee(&title, "a-404").await?.is_none());

    Ok(())
}

/// Test that an expired attendee record reads as absent.
#[sqlx::test(migrations = "../../migrations")]
async fn test_expired_attendee_record_is_absent(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool);
    let title = RoomTitle::normalized("standup-1");

    store
        .put_attendee(NewAttendeeRecord {
            title: title.clone(),
            attendee_id: "a-1".to_string(),
            display_name: "Alice".to_string(),
            ttl: Duration::seconds(-10),
        })
        .await?;

    assert!(store.get_attendee(&title, "a-1").await?.is_none());

    Ok(())
}

/// Test that purge_expired removes only expired rows and reports counts.
#[sqlx::test(migrations = "../../migrations")]
async fn test_purge_expired_removes_only_expired_rows(pool: PgPool) -> Result<(), anyhow::Error> {
    let store = PgMeetingRecordStore::new(pool.clone());

    store
        .create_room(
            new_record("standup-live", "m-001", Duration::hours(1)),
            opening("standup-live", "Alice"),
        )
        .await?;
    store
        .create_room(
            new_record("standup-dead", "m-002", Duration::seconds(-10)),
            opening("standup-dead", "Bob"),
        )
        .await?;
    store
        .put_attendee(NewAttendeeRecord {
            title: RoomTitle::normalized("standup-dead"),
            attendee_id: "a-1".to_string(),
            display_name: "Bob".to_string(),
            ttl: Duration::seconds(-10),
        })
        .await?;

    let purged = PgMeetingRecordStore::purge_expired(&pool).await?;
    assert_eq!(purged, 2);

    let live: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meeting_records")
        .fetch_one(&pool)
        .await?;
    assert_eq!(live, 1);

    // A second sweep finds nothing.
    let purged = PgMeetingRecordStore::purge_expired(&pool).await?;
    assert_eq!(purged, 0);

    Ok(())
}
