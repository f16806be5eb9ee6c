//! Room Controller (RC) Service Library
//!
//! Core session-lifecycle and occupancy-accounting logic for ad-hoc team
//! video meetings. A meeting is tied to a logical "room" identified by a
//! title; the RC decides whether a live session already exists for that
//! title, reuses or creates the provider-side meeting, admits attendees,
//! and keeps a durable ledger of who occupied the room and for how long.
//!
//! The RC deliberately does **not** own the media transport (delegated to
//! an external conferencing provider), the identity layer, or the HTTP
//! front door; those collaborate with this library through the
//! [`services::SessionCoordinator`] API and the error taxonomy in
//! [`errors`].
//!
//! # Architecture
//!
//! ```text
//! front door ──► SessionCoordinator
//!                ├── ConferenceProviderGateway (HTTP, provider meetings/attendees)
//!                ├── MeetingRecordStore        (live-session records, TTL'd)
//!                ├── OccupancyLedger           (room-level occupancy intervals)
//!                └── ParticipantUsageTracker   (per-participant intervals)
//! ```
//!
//! # Key Design Decisions
//!
//! - **Postgres for state**: transactional multi-record writes pair the
//!   meeting record with its opening occupancy interval; descending
//!   `started_at` queries serve "latest interval" lookups; `expires_at`
//!   columns give logical TTL with a background sweeper for physical
//!   removal.
//! - **Interface-typed seams**: every collaborator of the coordinator is
//!   an async trait, so tests substitute in-memory fakes without
//!   process-wide mutation.
//! - **No internal retries**: provider failures are classified
//!   (bad request / unavailable / not found) and surfaced; retrying is
//!   the upstream handler's call.
//!
//! # Modules
//!
//! - [`config`] - Service configuration from environment
//! - [`errors`] - Error taxonomy with transport-status mapping
//! - [`models`] - Records, provider descriptors, request/outcome types
//! - [`repositories`] - Store traits and their Postgres implementations
//! - [`services`] - Provider gateway client and the session coordinator
//! - [`observability`] - Prometheus metrics
//! - [`tasks`] - Background expiry sweeper

pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
pub mod tasks;
