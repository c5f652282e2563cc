//! Test Helper Utilities
//!
//! Shared utilities for testing simlr-pl
#![allow(dead_code)]

pub mod mock_upstream;

// Re-export commonly used items
pub use mock_upstream::{artist_names, token_for, video_id_for, MockBehavior, MockUpstream};
