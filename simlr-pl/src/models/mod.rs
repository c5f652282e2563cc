//! Data models

pub mod catalog;
pub mod pipeline_run;

pub use catalog::{ArtistName, PlaylistReference, SimilarArtistSet, TrackDescriptor, VideoId};
pub use pipeline_run::{PipelineRun, PipelineStage, StageTransition};
