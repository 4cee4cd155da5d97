// Logging setup for the binary

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FORMAT_ENV: &str = "SCRIPTSYNC_LOG_FORMAT";
pub const LOG_DIR_ENV: &str = "SCRIPTSYNC_LOG_DIR";
const DEFAULT_FILTER: &str = "scriptsync=info";
const LOG_FILE_PREFIX: &str = "scriptsync.log";

/// Install the global subscriber.
///
/// Console output goes to stderr (`pretty` or `json`). When
/// `SCRIPTSYNC_LOG_DIR` is set a daily-rolling file is written as well; the
/// returned guard must live until exit so buffered lines get flushed.
pub fn init() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let (file_writer, guard) = match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(file_layer(file_writer))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .with(file_layer(file_writer))
                .init();
        }
    }

    Ok(guard)
}

fn file_layer<S>(writer: Option<NonBlocking>) -> Option<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    writer.map(|w| fmt::layer().with_writer(w).with_ansi(false))
}

pub fn log_dir() -> Option<PathBuf> {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(shellexpand::tilde(&s).into_owned()))
}
