//! Pipeline run state machine
//!
//! A run progresses through:
//! SEEDED → EXPANDED → TRACKS_RESOLVED → VIDEOS_RESOLVED → AGGREGATED
//!
//! FAILED is reachable from every non-terminal stage.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::catalog::{ArtistName, PlaylistReference, SimilarArtistSet, TrackDescriptor, VideoId};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    /// Seed accepted, nothing looked up yet
    Seeded,
    /// Similar artists chosen
    Expanded,
    /// One track per artist chosen
    TracksResolved,
    /// One video per track found
    VideosResolved,
    /// Playlist created (terminal)
    Aggregated,
    /// Run aborted (terminal)
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Aggregated | PipelineStage::Failed)
    }

    /// Stage that follows on success, `None` for terminal stages
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Seeded => Some(PipelineStage::Expanded),
            PipelineStage::Expanded => Some(PipelineStage::TracksResolved),
            PipelineStage::TracksResolved => Some(PipelineStage::VideosResolved),
            PipelineStage::VideosResolved => Some(PipelineStage::Aggregated),
            PipelineStage::Aggregated | PipelineStage::Failed => None,
        }
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize)]
pub struct StageTransition {
    pub run_id: Uuid,
    pub old_stage: PipelineStage,
    pub new_stage: PipelineStage,
    pub transitioned_at: DateTime<Utc>,
}

/// One invocation of the pipeline
///
/// Owns everything produced for a single seed; nothing is shared between runs.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub seed: ArtistName,
    pub stage: PipelineStage,
    pub artists: Option<SimilarArtistSet>,
    /// Index-aligned with `artists` (minus skipped entries)
    pub tracks: Vec<TrackDescriptor>,
    /// Index-aligned with `tracks`
    pub video_ids: Vec<VideoId>,
    pub playlist: Option<PlaylistReference>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(seed: ArtistName) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed,
            stage: PipelineStage::Seeded,
            artists: None,
            tracks: Vec::new(),
            video_ids: Vec::new(),
            playlist: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Move to the next stage on success
    ///
    /// Panics in debug builds when called from a terminal stage.
    pub fn advance(&mut self) -> StageTransition {
        debug_assert!(!self.stage.is_terminal(), "advance from terminal stage");
        let next = self.stage.next().unwrap_or(self.stage);
        self.transition_to(next)
    }

    /// Move to FAILED
    pub fn fail(&mut self) -> StageTransition {
        self.transition_to(PipelineStage::Failed)
    }

    fn transition_to(&mut self, new_stage: PipelineStage) -> StageTransition {
        let transition = StageTransition {
            run_id: self.run_id,
            old_stage: self.stage,
            new_stage,
            transitioned_at: Utc::now(),
        };
        self.stage = new_stage;

        if new_stage.is_terminal() {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Elapsed time in milliseconds (up to `ended_at` once terminal)
    pub fn elapsed_ms(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }
}
