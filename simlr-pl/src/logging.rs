//! Tracing setup for the `simlr` binary
//!
//! The subscriber goes in before configuration is read so config warnings are
//! not lost. A non-empty `RUST_LOG` fixes the filter for the whole process.
//! Otherwise logging starts at `info` and switches to `[logging] level` once
//! the config has loaded.

use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{reload, EnvFilter, Registry};

const STARTUP_LEVEL: &str = "info";

/// Handle for swapping the filter after startup
pub struct LogLevelHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LogLevelHandle {
    /// Switch to the configured level unless `RUST_LOG` is in charge
    ///
    /// Returns whether the filter changed.
    pub fn apply_config_level(&self, level: &str) -> Result<bool, reload::Error> {
        if self.env_override {
            return Ok(false);
        }
        self.handle.reload(EnvFilter::new(level))?;
        Ok(true)
    }
}

/// Build the subscriber without installing it
///
/// `env_directives` is the raw `RUST_LOG` value, if any. Blank or unparseable
/// directives are ignored.
pub fn subscriber<W>(
    make_writer: W,
    env_directives: Option<&str>,
) -> (impl Subscriber + Send + Sync + 'static, LogLevelHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = env_directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok());
    let env_override = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(STARTUP_LEVEL));

    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(make_writer));

    (subscriber, LogLevelHandle { handle, env_override })
}

/// Install the global subscriber writing to stderr
pub fn init() -> Result<LogLevelHandle, TryInitError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (subscriber, handle) = subscriber(std::io::stderr, directives.as_deref());
    subscriber.try_init()?;
    Ok(handle)
}
