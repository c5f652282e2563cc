//! Playlist aggregator
//!
//! Submits all video ids in one request and reads the playlist reference from
//! the location the endpoint redirects to.

use reqwest::Url;

use super::lookup_client::{LookupClient, LookupRequest};
use crate::error::{PipelineError, Result};
use crate::models::{PlaylistReference, VideoId};

const LIST_PARAM: &str = "list";

/// Batch playlist creation
#[derive(Clone)]
pub struct PlaylistAggregator {
    client: LookupClient,
    playlist_url: String,
}

impl PlaylistAggregator {
    pub fn new(client: LookupClient, playlist_url: impl Into<String>) -> Self {
        Self {
            client,
            playlist_url: playlist_url.into(),
        }
    }

    /// Create a playlist from `ids`, in order
    pub async fn build_playlist(&self, ids: &[VideoId]) -> Result<PlaylistReference> {
        if ids.is_empty() {
            return Err(PipelineError::EmptyBatch);
        }

        let joined = ids.iter().map(VideoId::as_str).collect::<Vec<_>>().join(",");
        let request = LookupRequest::get(&self.playlist_url).query("video_ids", joined);

        let response = self.client.request(request).await?;
        let reference = extract_reference(&response.final_url)?;

        tracing::debug!(videos = ids.len(), playlist = %reference, "Playlist created");
        Ok(reference)
    }
}

/// Value of the `list` query parameter in the resolved location
fn extract_reference(location: &str) -> Result<PlaylistReference> {
    let url = Url::parse(location).map_err(|e| {
        PipelineError::MalformedResponse(format!(
            "playlist location '{}' is not a URL: {}",
            location, e
        ))
    })?;

    let token = url
        .query_pairs()
        .find(|(name, _)| name == LIST_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            PipelineError::MalformedResponse(format!(
                "playlist location '{}' has no '{}' parameter",
                location, LIST_PARAM
            ))
        })?;

    if token.is_empty() {
        return Err(PipelineError::MalformedResponse(format!(
            "playlist location '{}' has an empty reference",
            location
        )));
    }

    Ok(PlaylistReference::new(token))
}
