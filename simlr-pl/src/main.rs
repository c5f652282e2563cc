//! simlr - playlist generator
//!
//! Prints the embed URL of a playlist built from artists similar to the seed.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use simlr_common::config::{resolve_lastfm_api_key, FailurePolicy, TomlConfig};
use simlr_pl::{logging, PlaylistGenerator};

#[derive(Debug, Parser)]
#[command(name = "simlr", version, about = "Build a video playlist from artists similar to a seed artist")]
struct Cli {
    /// Seed artist name
    seed: String,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Last.fm API key (overrides environment and config file)
    #[arg(long)]
    api_key: Option<String>,

    /// Maximum number of similar artists
    #[arg(long)]
    limit: Option<usize>,

    /// Worker pool capacity
    #[arg(long)]
    workers: Option<usize>,

    /// Drop artists or tracks that fail instead of failing the whole run
    #[arg(long)]
    skip_failed: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logging first so config warnings are visible
    let log_level = logging::init()?;
    info!("Starting simlr {}", env!("CARGO_PKG_VERSION"));

    let mut config = TomlConfig::load(cli.config.as_deref())?;
    if let Some(limit) = cli.limit {
        config.pipeline.similar_limit = limit;
    }
    if let Some(workers) = cli.workers {
        config.pipeline.workers = workers;
    }
    if cli.skip_failed {
        config.pipeline.failure_policy = FailurePolicy::SkipFailed;
    }
    config.validate()?;
    log_level.apply_config_level(&config.logging.level)?;

    let api_key = resolve_lastfm_api_key(cli.api_key.as_deref(), &config);
    let generator = PlaylistGenerator::new(&config, api_key)?;

    match generator.generate_playlist(&cli.seed).await {
        Some(url) => {
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No playlist could be generated for '{}'", cli.seed);
            Ok(ExitCode::FAILURE)
        }
    }
}
