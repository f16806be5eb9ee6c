//! Repository layer for the Room Controller.
//!
//! Each repository pairs a store trait (the seam the coordinator is
//! constructed against) with its Postgres implementation. All queries use
//! parameterized statements; multi-record writes use transactions.

pub mod meeting_records;
pub mod occupancy;
pub mod participant_usage;

pub use meeting_records::{MeetingRecordStore, PgMeetingRecordStore};
pub use occupancy::{OccupancyLedger, PgOccupancyLedger};
pub use participant_usage::{ParticipantUsageTracker, PgParticipantUsageTracker};
