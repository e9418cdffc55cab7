//! Logging setup for applications embedding the engine.
//!
//! The library only emits `tracing` events; it never installs a subscriber.
//! Applications call [`init_logging`] once at start up:
//! - stdout output, compact format
//! - optional file output under the configured directory (cleared per session)
//! - `RUST_LOG` overrides the configured level

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to prepare the log directory or file
    #[error("Failed to prepare log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// True if a log file is written.
    pub fn has_file(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Filter for the configured level, unless `RUST_LOG` is set.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Path of the log file, if file output is configured.
pub fn log_file_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .directory
        .as_ref()
        .map(|dir| dir.join(&settings.file))
}

/// Install the global subscriber.
pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard, LoggingError> {
    let (file_layer, file_guard) = match &settings.directory {
        Some(dir) => {
            prepare_log_file(dir, &settings.file)?;
            let file_appender = tracing_appender::rolling::never(dir, &settings.file);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(&settings.level))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { file_guard })
}

/// Create the directory and truncate the previous session's file.
fn prepare_log_file(dir: &std::path::Path, file: &str) -> Result<(), LoggingError> {
    let path = dir.join(file);
    fs::create_dir_all(dir).map_err(|source| LoggingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, "").map_err(|source| LoggingError::Io { path, source })
}
