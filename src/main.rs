//! # Main Entry Point
//!
//! Wires the bot together:
//! - Domain: Configuration and Types
//! - Infrastructure: Twitter API, Filtered Stream, Counters
//! - Application: Rule Engine, Ignore Store, Dispatcher, Listener, Logging
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::dispatcher::ActionDispatcher;
use crate::application::engine::RuleEngine;
use crate::application::ignore::IgnoreStore;
use crate::application::listener::RetweetListener;
use crate::application::logging::{self, LogSettings};
use crate::domain::config::AppConfig;
use crate::domain::paths;
use crate::infrastructure::counters;
use crate::infrastructure::stream::{self, FilteredStream};
use crate::infrastructure::twitter::TwitterClient;
use crate::strings::logs;

/// Retweets posts matching the configured keywords.
#[derive(Debug, Parser)]
#[command(name = "vierzehn", version, about)]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = paths::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

/// How a pass over one stream connection ended.
#[derive(Debug, PartialEq)]
enum StreamOutcome {
    Interrupted,
    Disconnected,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    let data_dir = config.data_dir();
    let _guard = logging::init(&LogSettings {
        dir: config.system.log_file.then(|| data_dir.clone()),
        verbose: cli.verbose,
    })?;
    tracing::info!("{}", logs::STARTING);
    tracing::info!("{}", logs::config_loaded(&cli.config.display().to_string()));

    // 3. Initialize Infrastructure
    let twitter =
        TwitterClient::new(&config.services.twitter).context("Failed to build HTTP client")?;
    let identity = twitter
        .verify_credentials()
        .await
        .context("Failed to look up the bot account")?;
    tracing::info!("{}", logs::logged_in(&identity.handle));
    let twitter = twitter.acting_as(&identity);

    let counters = counters::connect(config.services.redis.as_ref()).await;
    let stream = FilteredStream::new(&config.services.twitter)
        .context("Failed to build stream client")?;
    let terms = config
        .words
        .track_terms(&identity, config.replies.mention_reactions);

    // 4. Initialize Application Components
    let ignored = IgnoreStore::load(config.ignore_path());
    let engine = RuleEngine::new(identity, config.words.clone(), config.replies.clone());
    let dispatcher = ActionDispatcher::new(Arc::new(twitter), counters);
    let mut listener = RetweetListener::new(engine, ignored, dispatcher);

    // 5. Event Loop
    let reconnect_delay = Duration::from_secs(config.system.reconnect_delay_secs);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let outcome = run_stream(
            &stream,
            &terms,
            &mut listener,
            stream::KEEP_ALIVE_TIMEOUT,
            &mut shutdown,
        )
        .await;
        match outcome {
            StreamOutcome::Interrupted => break,
            StreamOutcome::Disconnected => {
                tracing::info!("{}", logs::reconnecting(reconnect_delay.as_secs()));
                tokio::select! {
                    res = &mut shutdown => {
                        log_shutdown(res);
                        break;
                    }
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }

    Ok(())
}

/// Connects once and feeds posts to the listener until the stream ends, goes quiet for
/// longer than `keep_alive` or the user interrupts. A post being handled when the interrupt
/// arrives is finished first.
async fn run_stream<F>(
    stream: &FilteredStream,
    terms: &[String],
    listener: &mut RetweetListener,
    keep_alive: Duration,
    shutdown: &mut std::pin::Pin<&mut F>,
) -> StreamOutcome
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    let connected = tokio::select! {
        res = shutdown.as_mut() => {
            log_shutdown(res);
            return StreamOutcome::Interrupted;
        }
        connected = async {
            match stream.sync_rules(terms).await {
                Ok(()) => stream.connect().await,
                Err(e) => Err(e),
            }
        } => connected,
    };
    let mut posts = match connected {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("{}", logs::stream_failed(&e.to_string()));
            return StreamOutcome::Disconnected;
        }
    };

    loop {
        tokio::select! {
            res = shutdown.as_mut() => {
                log_shutdown(res);
                return StreamOutcome::Interrupted;
            }
            next = tokio::time::timeout(keep_alive, posts.next()) => match next {
                Ok(Some(Ok(post))) => listener.on_post(post).await,
                Ok(Some(Err(e))) => {
                    tracing::error!("{}", logs::stream_failed(&e.to_string()));
                    return StreamOutcome::Disconnected;
                }
                Ok(None) => {
                    tracing::warn!("{}", logs::STREAM_ENDED);
                    return StreamOutcome::Disconnected;
                }
                Err(_) => {
                    tracing::warn!("{}", logs::stream_stalled(keep_alive.as_secs()));
                    return StreamOutcome::Disconnected;
                }
            }
        }
    }
}

fn log_shutdown(res: std::io::Result<()>) {
    match res {
        Ok(()) => tracing::info!("{}", logs::SHUTDOWN),
        Err(e) => tracing::error!("{}", logs::shutdown_fail(&e.to_string())),
    }
}
