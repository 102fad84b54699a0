//! Tracing subscriber setup.
//!
//! The terminal board owns the screen, so it logs to a file. Every other
//! command logs warnings to stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Overrides the configured level, e.g. `DEALBOARD_LOG=dealboard=debug`.
pub const LOG_ENV: &str = "DEALBOARD_LOG";

pub const STDERR_LEVEL: &str = "warn";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Log to stderr for one-shot commands.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(env_filter(STDERR_LEVEL))
        .try_init()
        .context("Failed to install stderr logger")
}

/// Open the appender for `path`, creating its directory.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log path has no file name: {}", path.display()))?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Append to `path` through a background writer.
///
/// Buffered lines are flushed when the returned guard drops, so keep it
/// alive for as long as the board runs.
pub fn init_file(path: &Path, level: &str) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(level))
        .try_init()
        .context("Failed to install file logger")?;
    Ok(guard)
}

/// File logging for the board. A log that cannot be set up is reported
/// on stderr and the board runs without one.
pub fn init_board(path: Option<&Path>, level: &str) -> Option<WorkerGuard> {
    let path = path?;
    match init_file(path, level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: running without a log file: {err:#}");
            None
        }
    }
}
