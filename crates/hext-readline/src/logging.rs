//! Tracing setup. Logs go to a daily rolling file so the REPL stays clean.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Picks the filter: `--log-level`, then `RUST_LOG`, then `info`.
fn env_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber writing to `logs_dir/hext.log.YYYY-MM-DD`.
///
/// The returned guard flushes buffered lines when dropped; keep it alive for
/// the whole program.
pub fn init(logs_dir: &Path, level: Option<&str>) -> Result<WorkerGuard> {
    let filter = env_filter(level)?;
    let (writer, guard) = file_writer(logs_dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// Creates `logs_dir` and a non-blocking writer onto its daily log file.
fn file_writer(logs_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "hext.log");
    Ok(tracing_appender::non_blocking(file_appender))
}
