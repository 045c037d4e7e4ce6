use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::Event;

use super::bridge::{bridged_caller, is_record_field, parse_prefixed};
use crate::error::LoggingError;

/// Source tag for events emitted by this application's own code.
pub const APP_SOURCE: &str = "app";

/// One line of the JSON log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub msg: String,
    pub target: String,
    pub file: String,
    pub line: u32,
    pub source: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogEntry {
    /// Build an entry from a tracing event.
    ///
    /// Caller metadata always comes from the event itself: the callsite for
    /// native events, the original record for events bridged from `log`.
    /// Event fields that would shadow a fixed key are kept under a
    /// `fields.` prefix.
    pub fn from_event(event: &Event<'_>, framework: &str, now: DateTime<Utc>) -> Self {
        let metadata = event.metadata();
        let bridged = bridged_caller(event);
        let mut visitor = FieldVisitor::new(bridged.is_some());
        event.record(&mut visitor);
        let mut msg = visitor.message.unwrap_or_default();

        let (target, file, line, source) = match bridged {
            Some(caller) => {
                let (file, line) = match parse_prefixed(&msg) {
                    Some((file, line, rest)) => {
                        msg = rest;
                        (file, line)
                    }
                    None => (caller.file, caller.line),
                };
                (caller.target, file, line, framework.to_string())
            }
            None => (
                metadata.target().to_string(),
                metadata.file().map(caller_file).unwrap_or_default(),
                metadata.line().unwrap_or(0),
                resolve_source(metadata.target(), framework).to_string(),
            ),
        };

        Self {
            time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            level: metadata.level().as_str().to_ascii_lowercase(),
            msg,
            target,
            file,
            line,
            source,
            fields: visitor.fields,
        }
    }

    /// Serialize as a single newline-terminated JSON object.
    pub fn to_json_line(&self) -> Result<Vec<u8>, LoggingError> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Base name of a source path: `src/api/health.rs` becomes `health.rs`.
pub fn caller_file(path: &str) -> String {
    // record paths may use either separator regardless of the host
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// `framework` for targets inside the framework's crate, [`APP_SOURCE`] otherwise.
pub fn resolve_source<'a>(target: &str, framework: &'a str) -> &'a str {
    let inside = target
        .strip_prefix(framework)
        .map(|rest| rest.is_empty() || rest.starts_with("::"))
        .unwrap_or(false);
    if inside && !framework.is_empty() {
        framework
    } else {
        APP_SOURCE
    }
}

// keys written by `LogEntry` itself
const FIXED_KEYS: [&str; 7] = ["time", "level", "msg", "target", "file", "line", "source"];

struct FieldVisitor {
    bridged: bool,
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn new(bridged: bool) -> Self {
        Self {
            bridged,
            message: None,
            fields: Map::new(),
        }
    }

    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if self.bridged && is_record_field(name) {
            // already surfaced through the bridged caller
        } else if FIXED_KEYS.contains(&name) {
            self.fields.insert(format!("fields.{}", name), value);
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_file_strips_directories() {
        assert_eq!(caller_file("src/api/health.rs"), "health.rs");
        assert_eq!(caller_file("C:\\work\\src\\main.rs"), "main.rs");
        assert_eq!(caller_file("lib.rs"), "lib.rs");
    }

    #[test]
    fn test_resolve_source() {
        assert_eq!(resolve_source("poem", "poem"), "poem");
        assert_eq!(resolve_source("poem::server", "poem"), "poem");
        assert_eq!(resolve_source("poem_openapi::base", "poem"), APP_SOURCE);
        assert_eq!(resolve_source("registry_manager::api", "poem"), APP_SOURCE);
        assert_eq!(resolve_source("anything", ""), APP_SOURCE);
    }

    #[test]
    fn test_json_line_flattens_fields() {
        let mut fields = Map::new();
        fields.insert("request_id".to_string(), Value::from("abc"));
        let entry = LogEntry {
            time: "2024-01-01T00:00:00.000Z".to_string(),
            level: "info".to_string(),
            msg: "hello".to_string(),
            target: "registry_manager".to_string(),
            file: "main.rs".to_string(),
            line: 12,
            source: APP_SOURCE.to_string(),
            fields,
        };

        let bytes = entry.to_json_line().unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["msg"], "hello");
        assert_eq!(value["line"], 12);
        assert_eq!(value["source"], "app");
        assert_eq!(value["request_id"], "abc");

        let back: LogEntry = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, entry);
    }
}
