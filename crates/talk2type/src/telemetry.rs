//! Tracing subscriber setup: stdout plus an optional daily-rotated log file.

use crate::{AppError, AppResult, config::LoggingConfig};

use std::{
    ffi::OsString,
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// The returned guard flushes the file writer and must live until exit.
#[track_caller]
pub(crate) fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let filter = build_filter(&config.filter)?;
    let stdout_layer = fmt::layer().with_target(false);

    let (text_layer, json_layer, guard) = match &config.file {
        Some(path) => {
            let (dir, prefix) = log_file_parts(path)?;
            fs::create_dir_all(&dir)?;

            let appender = tracing_appender::rolling::daily(&dir, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            if config.json {
                let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
                (None, Some(layer), Some(guard))
            } else {
                let layer = fmt::layer().with_ansi(false).with_writer(writer);
                (Some(layer), None, Some(guard))
            }
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(text_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| AppError::TelemetryError {
            reason: format!("Failed to install subscriber: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!(file = ?config.file, json = config.json, "Logging initialised");

    Ok(guard)
}

/// `RUST_LOG` when set, otherwise the configured directives.
#[track_caller]
pub(crate) fn build_filter(directives: &str) -> AppResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(directives).map_err(|e| AppError::TelemetryError {
            reason: format!("Invalid log filter {:?}: {}", directives, e),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Split a log path into the rolling appender's directory and file prefix.
#[track_caller]
pub(crate) fn log_file_parts(path: &Path) -> AppResult<(PathBuf, OsString)> {
    let prefix = path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| AppError::TelemetryError {
            reason: format!("Log file path has no file name: {:?}", path),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, prefix))
}
