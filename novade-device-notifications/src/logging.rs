//! Logging setup for the notifier.
//!
//! Everything in the crate logs through `tracing`; this module only installs
//! the global subscriber. [`init_logging`] builds a stdout layer and, when a
//! log file is configured, a daily-rotated file layer. Both honour the
//! configured level and format.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{LoggingError, NotifierResult};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const DEFAULT_LOG_FILE_NAME: &str = "device-notifications.log";

/// Keeps the file writer flushing until the process exits.
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Stderr logging filtered by `RUST_LOG` (default `info`). Used before the
/// configuration is known, and in tests. Does nothing if a subscriber is
/// already installed.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

/// Installs the global subscriber described by `config`.
///
/// # Arguments
///
/// * `config`: Level, format and optional log file.
///
/// # Errors
///
/// Returns `DeviceNotificationError::Logging` wrapping
/// [`LoggingError::InitializationFailure`] for an unknown level or when a
/// global subscriber is already set, or [`LoggingError::Directory`] when the
/// log file's directory cannot be created.
pub fn init_logging(config: &LoggingConfig) -> NotifierResult<()> {
    let level = parse_level(&config.level)?;
    let json = config.format.eq_ignore_ascii_case("json");

    let stdout_layer: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    };

    let mut layers = vec![stdout_layer];
    let mut file_guard = None;
    if let Some(path) = &config.file_path {
        let (layer, guard) = file_layer(path, json)?;
        layers.push(layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        file_guard = Some(guard);
    }

    Registry::default().with(layers).try_init().map_err(|e| {
        LoggingError::InitializationFailure(format!("global subscriber already set: {}", e))
    })?;

    *FILE_GUARD.lock().unwrap_or_else(PoisonError::into_inner) = file_guard;
    tracing::debug!(level = %level, format = %config.format, file = ?config.file_path, "Logging initialized");
    Ok(())
}

fn parse_level(level: &str) -> Result<Level, LoggingError> {
    level
        .parse::<Level>()
        .map_err(|_| LoggingError::InitializationFailure(format!("Invalid log level in config: {}", level)))
}

fn file_layer(path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE_NAME));

    let appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: BoxedLayer = if json {
        fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}
