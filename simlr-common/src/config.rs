//! Bootstrap configuration and credential resolution
//!
//! Configuration is read once at startup from a TOML file and threaded through
//! constructors explicitly. Every field has a built-in default, so a missing
//! file (or a file with only a few keys) is valid.
//!
//! # Settings Sources Priority (Last.fm API key)
//!
//! 1. Command-line argument (`--api-key`)
//! 2. Environment variable `SIMLR_LASTFM_API_KEY`
//! 3. Legacy environment variable `LASTFM_API_KEY`
//! 4. TOML configuration file (`lastfm_api_key`)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Primary environment variable holding the Last.fm API key
pub const API_KEY_ENV: &str = "SIMLR_LASTFM_API_KEY";

/// Environment variable name used by older deployments
pub const LEGACY_API_KEY_ENV: &str = "LASTFM_API_KEY";

/// Placeholder substituted with the playlist reference in the embed template
pub const LIST_PLACEHOLDER: &str = "{list}";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Last.fm API key used by the similarity and top-tracks lookups
    pub lastfm_api_key: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Pipeline tuning
    pub pipeline: PipelineSettings,

    /// External service locations
    pub endpoints: EndpointConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// What a fan-out stage does when one of its workers fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failed worker fails the whole run
    #[default]
    AllOrNothing,
    /// Failed items are dropped; the run continues with the survivors
    SkipFailed,
}

/// How candidate videos are located in a search result page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Anchor elements whose link target starts with the watch prefix
    Anchor,
    /// Watch links embedded in inline script data
    Embedded,
    /// Anchors first, embedded data when no anchor matches
    #[default]
    Any,
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Maximum number of similar artists in one playlist
    pub similar_limit: usize,
    /// Number of candidates requested from the similarity service before sampling
    pub similar_fetch_limit: usize,
    /// Number of top tracks requested per artist
    pub top_tracks_limit: usize,
    /// Worker pool capacity for the fan-out stages
    pub workers: usize,
    pub failure_policy: FailurePolicy,
    /// Text appended to every video search query
    pub search_hint: String,
    pub match_strategy: MatchStrategy,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Minimum spacing between two requests of the same client (0 disables)
    pub min_request_interval_ms: u64,
    /// Fixed seed for the random choices (random per run when absent)
    pub rng_seed: Option<u64>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            similar_limit: 20,
            similar_fetch_limit: 100,
            top_tracks_limit: 50,
            workers: 20,
            failure_policy: FailurePolicy::default(),
            search_hint: ", video".to_string(),
            match_strategy: MatchStrategy::default(),
            request_timeout_secs: 30,
            min_request_interval_ms: 0,
            rng_seed: None,
        }
    }
}

/// External service locations
///
/// Overridable so tests (or mirrors) can point the pipeline elsewhere.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Last.fm web service root (similar artists and top tracks)
    pub lastfm_url: String,
    /// Video search results page
    pub video_search_url: String,
    /// Canonical origin prefixed to relative watch links
    pub video_origin: String,
    /// Path prefix identifying a watch link
    pub watch_prefix: String,
    /// Batch endpoint that turns a list of video ids into a playlist
    pub playlist_url: String,
    /// Public playlist URL; `{list}` is replaced by the playlist reference
    pub embed_url_template: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            lastfm_url: "http://ws.audioscrobbler.com/2.0/".to_string(),
            video_search_url: "https://www.youtube.com/results".to_string(),
            video_origin: "https://youtube.com".to_string(),
            watch_prefix: "/watch?v=".to_string(),
            playlist_url: "https://youtube.com/watch_videos".to_string(),
            embed_url_template: "https://youtube.com/embed/video_series?list={list}&autoplay=1"
                .to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the platform default path is
    /// tried and built-in defaults are used when it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    info!("No config file found, using built-in defaults");
                    let mut config = TomlConfig::default();
                    config.validate()?;
                    return Ok(config);
                }
            },
        };

        if !path.exists() {
            return Err(Error::Config(format!("Config file {} not found", path.display())));
        }
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Check value ranges, clamping the ones that have a safe correction
    pub fn validate(&mut self) -> Result<()> {
        let pipeline = &mut self.pipeline;

        if pipeline.similar_limit == 0 {
            return Err(Error::Config("pipeline.similar_limit must be at least 1".to_string()));
        }
        if pipeline.workers == 0 {
            return Err(Error::Config("pipeline.workers must be at least 1".to_string()));
        }
        if pipeline.top_tracks_limit == 0 {
            return Err(Error::Config("pipeline.top_tracks_limit must be at least 1".to_string()));
        }
        if pipeline.similar_fetch_limit < pipeline.similar_limit {
            warn!(
                fetch_limit = pipeline.similar_fetch_limit,
                limit = pipeline.similar_limit,
                "similar_fetch_limit below similar_limit, raising it"
            );
            pipeline.similar_fetch_limit = pipeline.similar_limit;
        }
        if !self.endpoints.embed_url_template.contains(LIST_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "endpoints.embed_url_template must contain {}",
                LIST_PLACEHOLDER
            )));
        }
        if self.endpoints.watch_prefix.is_empty() {
            return Err(Error::Config("endpoints.watch_prefix must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/simlr/config.toml` on Linux, the equivalent config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("simlr").join("config.toml"))
}

/// Resolve the Last.fm API key
///
/// Returns `None` when no source holds a valid key. Absence is reported by the
/// pipeline when it needs the key, not here.
pub fn resolve_lastfm_api_key(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let candidates = [
        ("command line", cli_arg.map(str::to_string)),
        ("environment", std::env::var(API_KEY_ENV).ok()),
        ("legacy environment", std::env::var(LEGACY_API_KEY_ENV).ok()),
        ("TOML", toml_config.lastfm_api_key.clone()),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "Last.fm API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("Last.fm API key loaded from {}", source);
            Some(key.trim().to_string())
        }
        None => {
            warn!("Last.fm API key not configured (set {} or lastfm_api_key)", API_KEY_ENV);
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = TomlConfig::default();
        assert_eq!(config.pipeline.similar_limit, 20);
        assert_eq!(config.pipeline.workers, 20);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::AllOrNothing);
        assert_eq!(config.pipeline.search_hint, ", video");
        assert!(config.endpoints.embed_url_template.contains(LIST_PLACEHOLDER));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            lastfm_api_key = "abc"

            [pipeline]
            similar_limit = 5
            failure_policy = "skip_failed"
            match_strategy = "anchor"
            "#,
        )
        .unwrap();

        assert_eq!(config.lastfm_api_key.as_deref(), Some("abc"));
        assert_eq!(config.pipeline.similar_limit, 5);
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::SkipFailed);
        assert_eq!(config.pipeline.match_strategy, MatchStrategy::Anchor);
        assert_eq!(config.pipeline.workers, 20);
        assert_eq!(config.endpoints.watch_prefix, "/watch?v=");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = TomlConfig::from_toml_str("[pipeline]\nworkers = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_fetch_limit_raised_to_limit() {
        let config = TomlConfig::from_toml_str(
            "[pipeline]\nsimilar_limit = 30\nsimilar_fetch_limit = 10\n",
        )
        .unwrap();
        assert_eq!(config.pipeline.similar_fetch_limit, 30);
    }

    #[test]
    fn test_embed_template_requires_placeholder() {
        let result = TomlConfig::from_toml_str(
            "[endpoints]\nembed_url_template = \"https://example.com/embed\"\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let result = TomlConfig::from_toml_str("[pipeline]\nfailure_policy = \"sometimes\"\n");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   \t"));
    }
}
