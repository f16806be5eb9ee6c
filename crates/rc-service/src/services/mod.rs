//! Service layer for the Room Controller.
//!
//! # Components
//!
//! - `provider_client` - Gateway trait + HTTP client for the external
//!   conferencing provider
//! - `session_coordinator` - The create-or-reuse-then-join workflow and
//!   room teardown

pub mod provider_client;
pub mod session_coordinator;

pub use provider_client::{ConferenceProviderGateway, CreateMeetingRequest, HttpProviderClient};
pub use session_coordinator::{CoordinatorSettings, SessionCoordinator};
