//! Routes records from the `log` facade into `tracing`.
//!
//! The web framework and parts of its dependency tree log through `log`
//! rather than `tracing`. [`install`] registers `tracing_log::LogTracer` as the
//! global `log` logger, so those records reach the same subscriber as the rest
//! of the application and are filtered by their own target. [`bridged_caller`]
//! recovers the record's caller from such an event.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level};
use tracing_log::{LogTracer, NormalizeEvent};

use super::entry::caller_file;
use crate::error::LoggingError;

// `[W] [router.rs:17] route added`
static PREFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\[[A-Z]\] \[(.*):(\d+)\] (.*)$").expect("valid regex"));

/// Where a bridged `log` record was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub target: String,
    pub file: String,
    pub line: u32,
}

/// Register `LogTracer` as the process-wide `log` logger, passing through
/// records up to `max_level`.
pub fn install(max_level: LevelFilter) -> Result<(), LoggingError> {
    LogTracer::builder()
        .with_max_level(log_level_filter(max_level))
        .init()?;
    Ok(())
}

/// The caller of a record that came in through the `log` facade, or `None`
/// for native `tracing` events.
pub fn bridged_caller(event: &Event<'_>) -> Option<Caller> {
    let metadata = event.normalized_metadata()?;
    Some(Caller {
        target: metadata.target().to_string(),
        file: metadata.file().map(caller_file).unwrap_or_default(),
        line: metadata.line().unwrap_or(0),
    })
}

/// Fields `LogTracer` attaches to carry the record's metadata.
pub fn is_record_field(name: &str) -> bool {
    name.starts_with("log.")
}

/// The `log` filter that lets through exactly what `filter` lets through.
pub fn log_level_filter(filter: LevelFilter) -> log::LevelFilter {
    match filter.into_level() {
        None => log::LevelFilter::Off,
        Some(Level::ERROR) => log::LevelFilter::Error,
        Some(Level::WARN) => log::LevelFilter::Warn,
        Some(Level::INFO) => log::LevelFilter::Info,
        Some(Level::DEBUG) => log::LevelFilter::Debug,
        Some(_) => log::LevelFilter::Trace,
    }
}

/// Split a message carrying a `[L] [file:line] ` caller prefix into its
/// caller file, line and the remaining text.
pub fn parse_prefixed(message: &str) -> Option<(String, u32, String)> {
    let caps = PREFIXED.captures(message)?;
    let line = caps[2].parse().ok()?;
    Some((caller_file(&caps[1]), line, caps[3].to_string()))
}
