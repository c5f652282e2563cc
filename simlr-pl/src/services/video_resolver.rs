//! Video resolver
//!
//! Searches for "title - artist" plus a hint and picks one of the watch links
//! the configured matcher finds in the result page.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use super::lookup_client::{LookupClient, LookupRequest};
use super::video_matcher::VideoMatcher;
use crate::error::{PipelineError, Result};
use crate::models::{TrackDescriptor, VideoId};

/// Search endpoint settings
#[derive(Debug, Clone)]
pub struct VideoSearchConfig {
    pub search_url: String,
    /// Origin prefixed to relative watch links
    pub origin: String,
    pub watch_prefix: String,
    /// Appended to every query
    pub hint: String,
}

/// Track → video id lookup
#[derive(Clone)]
pub struct VideoResolver {
    client: LookupClient,
    config: VideoSearchConfig,
    matcher: Arc<dyn VideoMatcher>,
}

impl VideoResolver {
    pub fn new(client: LookupClient, config: VideoSearchConfig, matcher: Arc<dyn VideoMatcher>) -> Self {
        Self {
            client,
            config,
            matcher,
        }
    }

    /// Video id for `track`, chosen uniformly among matching results
    pub async fn resolve<R: Rng + ?Sized>(
        &self,
        track: &TrackDescriptor,
        rng: &mut R,
    ) -> Result<VideoId> {
        let query = track.search_query(&self.config.hint);
        let request = LookupRequest::get(&self.config.search_url).query("search_query", &query);

        let page = self.client.request(request).await?.body.into_text();
        let ids = self.candidate_ids(&page);

        tracing::debug!(
            track = %track,
            matcher = self.matcher.name(),
            candidates = ids.len(),
            "Search results matched"
        );

        ids.choose(rng)
            .cloned()
            .ok_or_else(|| PipelineError::NoVideoMatch(track.to_string()))
    }

    /// Video ids of all matching links, as absolute watch URLs reduced to ids
    fn candidate_ids(&self, page: &str) -> Vec<VideoId> {
        self.matcher
            .candidates(page, &self.config.watch_prefix)
            .into_iter()
            .map(|link| self.absolute(&link))
            .filter_map(|url| VideoId::from_watch_url(&url))
            .collect()
    }

    fn absolute(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}{}", self.config.origin.trim_end_matches('/'), link)
        }
    }
}
