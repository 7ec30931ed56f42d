//! Tracing subscriber setup.
//!
//! Logs always go to stdout. When a log file is configured (and testing mode is
//! off) the same events are also written to that file through a non-blocking
//! writer. Both sinks share the format selected by `logging.format`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{fmt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::AppConfig;

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to prepare log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log file path: {0}")]
    Path(String),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the process.
pub fn init_logging(config: &AppConfig, filter: &str) -> Result<Option<WorkerGuard>, LoggingError> {
    let json = config.logging.format == "json";
    let env_filter = EnvFilter::try_new(filter)?;
    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(json)];

    let guard = match config.log_file() {
        Some(path) => {
            let (layer, guard) = file_layer(Path::new(path), json)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    if let Some(path) = config.log_file() {
        tracing::info!(file = %path, "Writing logs to file");
    }
    Ok(guard)
}

fn stdout_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    }
}

fn file_layer(path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    let (dir, file_name) = split_log_path(path)?;
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = if json {
        fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::Path(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, file_name))
}
