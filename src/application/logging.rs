//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: console output always, plus a plain-text
//! session log in the data directory when enabled. `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::paths;

/// HTTP and redis internals are only interesting when something breaks.
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,redis=warn";

pub struct LogSettings {
    /// Directory for the session log; `None` disables the file sink
    pub dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Initializes tracing. Keep the returned guard alive for the lifetime of the process,
/// otherwise buffered file output is lost.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if settings.verbose {
            EnvFilter::new("debug,reqwest=warn,hyper=warn,redis=warn")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let (file_layer, guard) = match &settings.dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, paths::LOG_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
