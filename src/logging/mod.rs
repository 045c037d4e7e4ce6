pub mod bridge;
pub mod entry;
pub mod file;
pub mod layer;
pub mod reader;

use std::path::{Path, PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::config::LogConfig;
use crate::error::LoggingError;

pub use entry::LogEntry;
pub use layer::JsonFileLayer;

/// Keeps the background file writer alive. Dropping it flushes pending
/// entries and stops file logging.
pub struct LogGuard {
    _worker: WorkerGuard,
    log_file: PathBuf,
}

impl LogGuard {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Install the process-wide logger.
///
/// Events go to the JSON log file and, when enabled, to stdout in the same
/// shape. Records from the `log` facade are bridged in, filtered by their own
/// target and tagged with the framework name.
/// Can succeed at most once per process.
pub fn init(config: &LogConfig) -> Result<LogGuard, LoggingError> {
    file::ensure_log_file(config)?;
    let (writer, worker) = tracing_appender::non_blocking(file::open_log_file(config)?);

    let filter =
        EnvFilter::try_new(&config.filter).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;
    let max_level = filter.max_level_hint().unwrap_or(LevelFilter::TRACE);

    let stdout_layer = config
        .stdout
        .then(|| JsonFileLayer::new(std::io::stdout, config.framework.clone()));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(JsonFileLayer::new(writer, config.framework.clone()))
        .with(stdout_layer);

    // Bridge first: if another `log` logger owns the facade, nothing global
    // has been touched yet.
    bridge::install(max_level)?;

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::Subscriber(e.to_string()))?;

    tracing::info!(
        log_file = %config.log_file.display(),
        framework = %config.framework,
        "logging initialized"
    );

    Ok(LogGuard {
        _worker: worker,
        log_file: config.log_file.clone(),
    })
}

/// [`init`], exiting the process when the log file cannot be set up.
pub fn init_or_exit(config: &LogConfig) -> LogGuard {
    match init(config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    }
}
