//! Error types for simlr-pl
//!
//! Components never retry and never swallow errors; everything propagates to
//! the orchestrator, which is the only place a failure becomes "no playlist".

use thiserror::Error;

/// External lookup errors
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status (or an error payload)
    #[error("Remote error {status}: {body}")]
    Remote { status: u16, body: String },
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Transport(err.to_string())
    }
}

/// Pipeline errors
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("No similar artists found for '{0}'")]
    NoSimilarArtists(String),

    #[error("No tracks found for '{0}'")]
    NoTracks(String),

    #[error("No video matched '{0}'")]
    NoVideoMatch(String),

    #[error("Cannot build a playlist from an empty batch")]
    EmptyBatch,

    /// A successful response lacked a structural marker it should carry
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Last.fm API key not configured")]
    MissingCredential,

    #[error("Invalid seed artist: {0}")]
    InvalidSeed(String),

    /// A worker task panicked or was aborted
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// Stable short code for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Lookup(LookupError::Transport(_)) => "transport",
            PipelineError::Lookup(LookupError::Remote { .. }) => "remote",
            PipelineError::NoSimilarArtists(_) => "no_similar_artists",
            PipelineError::NoTracks(_) => "no_tracks",
            PipelineError::NoVideoMatch(_) => "no_video_match",
            PipelineError::EmptyBatch => "empty_batch",
            PipelineError::MalformedResponse(_) => "malformed_response",
            PipelineError::MissingCredential => "missing_credential",
            PipelineError::InvalidSeed(_) => "invalid_seed",
            PipelineError::Worker(_) => "worker",
        }
    }

    /// True for the "lookup succeeded but found nothing" family
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            PipelineError::NoSimilarArtists(_)
                | PipelineError::NoTracks(_)
                | PipelineError::NoVideoMatch(_)
                | PipelineError::EmptyBatch
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
