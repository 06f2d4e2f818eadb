// ABOUTME: Process-wide tracing setup: console output plus an append-only log file
// ABOUTME: The migration engine only emits tracing events and never configures sinks

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Events with this target are written to the log file only.
pub const AUDIT_TARGET: &str = "audit";

pub const LOG_FILE_NAME: &str = "migrator.log";

/// Daily files kept in the log directory; older ones are pruned on rotation.
pub const LOG_RETENTION_DAYS: usize = 7;

/// `$HOME/.mongo-sample-migrator/logs`, when a home directory is known.
pub fn default_log_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| {
            PathBuf::from(home)
                .join(concat!(".", env!("CARGO_PKG_NAME")))
                .join("logs")
        })
}

/// Create `dir` if needed and open a daily-rolling appender inside it that
/// keeps at most [`LOG_RETENTION_DAYS`] files.
pub fn file_writer(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .max_log_files(LOG_RETENTION_DAYS)
        .build(dir)
        .with_context(|| format!("Failed to open log file in '{}'", dir.display()))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit so buffered file lines get flushed.
pub fn init(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() != AUDIT_TARGET));

    let (file, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(file_writer(dir)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
