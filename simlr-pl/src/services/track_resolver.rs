//! Track resolver
//!
//! Lists an artist's top tracks and picks one of them at random.

use rand::seq::SliceRandom;
use rand::Rng;

use super::lastfm::{names, nested_list, LastfmApi, NamedEntry};
use crate::error::{PipelineError, Result};
use crate::models::{ArtistName, TrackDescriptor};

const METHOD: &str = "artist.gettoptracks";

/// Top-tracks lookup
#[derive(Clone)]
pub struct TrackResolver {
    api: LastfmApi,
    limit: usize,
}

impl TrackResolver {
    /// `limit` caps the number of top tracks requested per artist
    pub fn new(api: LastfmApi, limit: usize) -> Self {
        Self { api, limit }
    }

    /// Top tracks of `artist` in service order, untitled entries removed
    pub async fn top_tracks(&self, artist: &ArtistName) -> Result<Vec<TrackDescriptor>> {
        let value = self.api.artist_method(METHOD, artist, self.limit).await?;
        let entries: Vec<NamedEntry> = nested_list(&value, "toptracks", "track")?;

        Ok(names(entries)
            .into_iter()
            .map(|title| TrackDescriptor::new(title, artist.clone()))
            .collect())
    }

    /// One top track of `artist`, chosen uniformly
    pub async fn pick_track<R: Rng + ?Sized>(
        &self,
        artist: &ArtistName,
        rng: &mut R,
    ) -> Result<TrackDescriptor> {
        let tracks = self.top_tracks(artist).await?;
        let track = tracks
            .choose(rng)
            .cloned()
            .ok_or_else(|| PipelineError::NoTracks(artist.to_string()))?;

        tracing::debug!(artist = %artist, available = tracks.len(), track = %track.title, "Track picked");
        Ok(track)
    }
}
