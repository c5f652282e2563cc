//! Catalog values passed between pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;
use simlr_common::config::LIST_PLACEHOLDER;

/// Non-empty artist name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistName(String);

impl ArtistName {
    /// Trim and validate an artist name
    pub fn new(name: impl AsRef<str>) -> Result<Self, PipelineError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(PipelineError::InvalidSeed("artist name is empty".to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Similar artists chosen for one run
///
/// Built once from the similarity lookup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimilarArtistSet {
    artists: Vec<ArtistName>,
}

impl SimilarArtistSet {
    pub(crate) fn new(artists: Vec<ArtistName>) -> Self {
        Self { artists }
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtistName> {
        self.artists.iter()
    }

    pub fn as_slice(&self) -> &[ArtistName] {
        &self.artists
    }
}

impl<'a> IntoIterator for &'a SimilarArtistSet {
    type Item = &'a ArtistName;
    type IntoIter = std::slice::Iter<'a, ArtistName>;

    fn into_iter(self) -> Self::IntoIter {
        self.artists.iter()
    }
}

/// One playable track: song title plus the artist it was looked up for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackDescriptor {
    pub title: String,
    pub artist: ArtistName,
}

impl TrackDescriptor {
    pub fn new(title: impl Into<String>, artist: ArtistName) -> Self {
        Self {
            title: title.into(),
            artist,
        }
    }

    /// Free-text search query: "title - artist" followed by the hint
    pub fn search_query(&self, hint: &str) -> String {
        format!("{} - {}{}", self.title, self.artist, hint)
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

/// Video identifier taken from a watch URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the id from a watch URL (`...v=<id>[&...]`)
    pub fn from_watch_url(url: &str) -> Option<Self> {
        let (_, rest) = url.split_once("v=")?;
        let id = rest.split(|c: char| c == '&' || c == '#').next().unwrap_or_default();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Playlist reference returned by the playlist-creation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistReference(String);

impl PlaylistReference {
    pub(crate) fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Public playlist URL built from the embed template
    pub fn embed_url(&self, template: &str) -> String {
        template.replace(LIST_PLACEHOLDER, &self.0)
    }
}

impl fmt::Display for PlaylistReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
