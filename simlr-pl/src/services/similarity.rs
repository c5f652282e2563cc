//! Similarity expander
//!
//! Turns a seed artist into a bounded set of similar artists. A larger pool
//! than needed is requested so the random sample has room to vary.

use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

use super::lastfm::{names, nested_list, LastfmApi, NamedEntry};
use crate::error::{PipelineError, Result};
use crate::models::{ArtistName, SimilarArtistSet};

const METHOD: &str = "artist.getsimilar";

/// Similar-artist lookup
#[derive(Clone)]
pub struct SimilarityExpander {
    api: LastfmApi,
    fetch_limit: usize,
}

impl SimilarityExpander {
    /// `fetch_limit` is the pool size requested from the service
    pub fn new(api: LastfmApi, fetch_limit: usize) -> Self {
        Self { api, fetch_limit }
    }

    /// Similar artists for `seed`, at most `limit` of them
    pub async fn expand<R: Rng + ?Sized>(
        &self,
        seed: &ArtistName,
        limit: usize,
        rng: &mut R,
    ) -> Result<SimilarArtistSet> {
        let fetch_limit = self.fetch_limit.max(limit);
        let value = self.api.artist_method(METHOD, seed, fetch_limit).await?;
        let entries: Vec<NamedEntry> = nested_list(&value, "similarartists", "artist")?;

        let candidates = dedup(names(entries))
            .into_iter()
            .map(ArtistName::new)
            .collect::<Result<Vec<_>>>()?;

        if candidates.is_empty() {
            return Err(PipelineError::NoSimilarArtists(seed.to_string()));
        }

        tracing::debug!(
            seed = %seed,
            candidates = candidates.len(),
            limit,
            "Similar artists received"
        );

        Ok(SimilarArtistSet::new(sample(candidates, limit, rng)))
    }
}

/// Drop repeated names, keeping the first occurrence
fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

/// Exactly `limit` distinct entries chosen uniformly when over the limit,
/// otherwise everything in received order
pub(crate) fn sample<T, R: Rng + ?Sized>(mut items: Vec<T>, limit: usize, rng: &mut R) -> Vec<T> {
    if items.len() <= limit {
        return items;
    }

    let mut picked: Vec<usize> = index::sample(rng, items.len(), limit).into_vec();
    // Remove from the back so earlier indices stay valid
    picked.sort_unstable_by(|a, b| b.cmp(a));
    let mut chosen: Vec<T> = picked.into_iter().map(|i| items.swap_remove(i)).collect();
    chosen.reverse();
    chosen
}
