//! # RC Test Utilities
//!
//! Shared test utilities for the Room Controller (RC) service.
//!
//! This crate provides mock implementations and test fixtures for
//! isolated RC testing without requiring real infrastructure:
//!
//! - `mock_provider` - In-memory conferencing provider with a live-meeting
//!   set, call recording, and scripted failures
//! - `mem_store` - One in-memory store implementing all three store traits
//! - `fixtures` - Request builders and default coordinator settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rc_test_utils::*;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let provider = Arc::new(MockProvider::new());
//!     let store = Arc::new(MemStore::new());
//!
//!     let coordinator = coordinator(provider.clone(), store.clone());
//!     let session = coordinator.join(join_request("standup-1", "Alice")).await.unwrap();
//!
//!     assert_eq!(provider.create_meeting_calls(), 1);
//! }
//! ```

pub mod fixtures;
pub mod mem_store;
pub mod mock_provider;

// Re-export commonly used items
pub use fixtures::*;
pub use mem_store::*;
pub use mock_provider::*;
