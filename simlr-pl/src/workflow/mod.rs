//! Playlist generation workflow
//!
//! Drives one run through SEEDED → EXPANDED → TRACKS_RESOLVED →
//! VIDEOS_RESOLVED → AGGREGATED. Expansion and aggregation run once on the
//! calling task; track and video resolution fan out over a `WorkerPool` and
//! each acts as a barrier before the next stage starts.
//!
//! `PlaylistGenerator::run` is the error boundary: every failure is logged and
//! turned into `None`.

pub mod worker_pool;

pub use worker_pool::WorkerPool;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Level};

use simlr_common::config::{FailurePolicy, PipelineSettings, TomlConfig};

use crate::error::{PipelineError, Result};
use crate::models::{ArtistName, PipelineRun, PlaylistReference, TrackDescriptor};
use crate::services::{
    matcher_for, LastfmApi, LookupClient, PlaylistAggregator, SimilarityExpander, TrackResolver,
    VideoMatcher, VideoResolver, VideoSearchConfig,
};

/// Lookups that need the Last.fm credential
struct CatalogLookups {
    expander: SimilarityExpander,
    tracks: TrackResolver,
}

/// End-to-end playlist generator
pub struct PlaylistGenerator {
    settings: PipelineSettings,
    embed_url_template: String,
    catalog: Option<CatalogLookups>,
    videos: VideoResolver,
    aggregator: PlaylistAggregator,
}

impl PlaylistGenerator {
    /// Build a generator from configuration
    ///
    /// `api_key` is the resolved Last.fm key. Without it the generator still
    /// builds, but every run fails with `MissingCredential`.
    pub fn new(config: &TomlConfig, api_key: Option<String>) -> Result<Self> {
        let matcher: Arc<dyn VideoMatcher> = Arc::from(matcher_for(config.pipeline.match_strategy));
        Self::with_matcher(config, api_key, matcher)
    }

    /// Build a generator with a custom video matching strategy
    pub fn with_matcher(
        config: &TomlConfig,
        api_key: Option<String>,
        matcher: Arc<dyn VideoMatcher>,
    ) -> Result<Self> {
        let settings = config.pipeline.clone();
        let endpoints = &config.endpoints;

        let client = LookupClient::new(
            Duration::from_secs(settings.request_timeout_secs),
            Duration::from_millis(settings.min_request_interval_ms),
        )?;

        let catalog = api_key.map(|key| {
            let api = LastfmApi::new(client.clone(), &endpoints.lastfm_url, key);
            CatalogLookups {
                expander: SimilarityExpander::new(api.clone(), settings.similar_fetch_limit),
                tracks: TrackResolver::new(api, settings.top_tracks_limit),
            }
        });

        let videos = VideoResolver::new(
            client.clone(),
            VideoSearchConfig {
                search_url: endpoints.video_search_url.clone(),
                origin: endpoints.video_origin.clone(),
                watch_prefix: endpoints.watch_prefix.clone(),
                hint: settings.search_hint.clone(),
            },
            matcher,
        );

        let aggregator = PlaylistAggregator::new(client, &endpoints.playlist_url);

        Ok(Self {
            settings,
            embed_url_template: endpoints.embed_url_template.clone(),
            catalog,
            videos,
            aggregator,
        })
    }

    /// Playlist for `seed`, or `None` when any step fails
    pub async fn run(&self, seed: &str) -> Option<PlaylistReference> {
        match self.generate(seed).await {
            Ok(run) => run.playlist,
            Err(_) => None,
        }
    }

    /// Public embed URL of a fresh playlist for `seed`, or `None`
    pub async fn generate_playlist(&self, seed: &str) -> Option<String> {
        self.run(seed)
            .await
            .map(|playlist| self.embed_url(&playlist))
    }

    /// Embed URL for an existing playlist reference
    pub fn embed_url(&self, playlist: &PlaylistReference) -> String {
        playlist.embed_url(&self.embed_url_template)
    }

    /// Execute the pipeline and return the full run record
    pub async fn generate(&self, seed: &str) -> Result<PipelineRun> {
        let seed = ArtistName::new(seed).map_err(|e| {
            warn!(error = %e, "Rejected seed artist");
            e
        })?;

        let mut run = PipelineRun::new(seed);
        info!(run_id = %run.run_id, seed = %run.seed, "Pipeline run started");

        match self.execute(&mut run).await {
            Ok(()) => {
                info!(
                    run_id = %run.run_id,
                    videos = run.video_ids.len(),
                    elapsed_ms = run.elapsed_ms(),
                    "Pipeline run completed"
                );
                Ok(run)
            }
            Err(e) => {
                let transition = run.fail();
                warn!(
                    run_id = %run.run_id,
                    stage = ?transition.old_stage,
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = run.elapsed_ms(),
                    "Pipeline run failed"
                );
                Err(e)
            }
        }
    }

    async fn execute(&self, run: &mut PipelineRun) -> Result<()> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or(PipelineError::MissingCredential)?;
        let mut rng = self.run_rng();

        // SEEDED → EXPANDED
        let artists = catalog
            .expander
            .expand(&run.seed, self.settings.similar_limit, &mut rng)
            .await?;
        run.artists = Some(artists.clone());
        advance(run);

        let pool = WorkerPool::new(self.settings.workers);

        // EXPANDED → TRACKS_RESOLVED
        let inputs = with_worker_rngs(artists.iter().cloned(), &mut rng);
        let resolver = catalog.tracks.clone();
        let results = pool
            .run_all(inputs, move |_, (artist, mut rng): (ArtistName, StdRng)| {
                let resolver = resolver.clone();
                async move { resolver.pick_track(&artist, &mut rng).await }
            })
            .await;
        run.tracks = settle("tracks", results, self.settings.failure_policy)?;
        advance(run);

        // TRACKS_RESOLVED → VIDEOS_RESOLVED
        let inputs = with_worker_rngs(run.tracks.iter().cloned(), &mut rng);
        let resolver = self.videos.clone();
        let results = pool
            .run_all(inputs, move |_, (track, mut rng): (TrackDescriptor, StdRng)| {
                let resolver = resolver.clone();
                async move { resolver.resolve(&track, &mut rng).await }
            })
            .await;
        let resolved = settle_indexed("videos", results, self.settings.failure_policy)?;
        if resolved.len() < run.tracks.len() {
            // Keep tracks and videos index-aligned after skips
            let kept: Vec<usize> = resolved.iter().map(|(index, _)| *index).collect();
            run.tracks = kept.iter().map(|&i| run.tracks[i].clone()).collect();
        }
        run.video_ids = resolved.into_iter().map(|(_, id)| id).collect();
        advance(run);

        // VIDEOS_RESOLVED → AGGREGATED
        let playlist = self.aggregator.build_playlist(&run.video_ids).await?;
        run.playlist = Some(playlist);
        advance(run);

        Ok(())
    }

    fn run_rng(&self) -> StdRng {
        match self.settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn advance(run: &mut PipelineRun) {
    let transition = run.advance();
    info!(
        run_id = %run.run_id,
        from = ?transition.old_stage,
        to = ?transition.new_stage,
        "Pipeline stage transition"
    );
}

/// Pair each input with its own RNG, derived in input order
fn with_worker_rngs<T>(items: impl Iterator<Item = T>, rng: &mut StdRng) -> Vec<(T, StdRng)> {
    items
        .map(|item| (item, StdRng::seed_from_u64(rng.gen())))
        .collect()
}

/// Apply the failure policy to a stage's results, keeping input order
fn settle<T>(stage: &str, results: Vec<Result<T>>, policy: FailurePolicy) -> Result<Vec<T>> {
    Ok(settle_indexed(stage, results, policy)?
        .into_iter()
        .map(|(_, value)| value)
        .collect())
}

/// Empty lookups are expected for obscure artists; anything else is a fault
fn failure_level(error: &PipelineError) -> Level {
    if error.is_empty_result() {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Like `settle`, keeping each survivor's input index
fn settle_indexed<T>(
    stage: &str,
    results: Vec<Result<T>>,
    policy: FailurePolicy,
) -> Result<Vec<(usize, T)>> {
    let total = results.len();
    let mut survivors = Vec::with_capacity(total);
    let mut first_error = None;

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => survivors.push((index, value)),
            Err(e) => {
                if failure_level(&e) == Level::DEBUG {
                    debug!(stage, index, kind = e.kind(), error = %e, "Worker found nothing");
                } else {
                    warn!(stage, index, kind = e.kind(), error = %e, "Worker failed");
                }
                first_error.get_or_insert(e);
            }
        }
    }

    let Some(error) = first_error else {
        return Ok(survivors);
    };

    match policy {
        FailurePolicy::AllOrNothing => Err(error),
        FailurePolicy::SkipFailed if survivors.is_empty() => Err(error),
        FailurePolicy::SkipFailed => {
            warn!(
                stage,
                failed = total - survivors.len(),
                kept = survivors.len(),
                "Dropping failed items"
            );
            Ok(survivors)
        }
    }
}
