//! simlr-pl library interface
//!
//! Builds a video playlist from a seed artist: similar artists from Last.fm,
//! one random top track per artist, one video per track, and a single batch
//! request that turns the video ids into a playlist.

pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{LookupError, PipelineError, Result};
pub use crate::models::{PipelineRun, PipelineStage, PlaylistReference};
pub use crate::workflow::PlaylistGenerator;

use simlr_common::config::TomlConfig;

/// Generate a playlist for `seed` and return its public embed URL
///
/// Never fails: any problem (including an unusable configuration) is logged
/// and reported as `None`.
pub async fn generate_playlist(config: &TomlConfig, api_key: Option<String>, seed: &str) -> Option<String> {
    match PlaylistGenerator::new(config, api_key) {
        Ok(generator) => generator.generate_playlist(seed).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize playlist generator");
            None
        }
    }
}
