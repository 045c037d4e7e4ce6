use std::io::Write;

use chrono::Utc;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};

use super::entry::LogEntry;
use crate::error::LoggingError;

/// Appends every event as one JSON object per line to `make_writer`,
/// tagged with caller file, line and source.
pub struct JsonFileLayer<W> {
    make_writer: W,
    framework: String,
}

impl<W> JsonFileLayer<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    pub fn new(make_writer: W, framework: impl Into<String>) -> Self {
        Self {
            make_writer,
            framework: framework.into(),
        }
    }

    /// Format and write a single event.
    pub fn write_event(&self, event: &Event<'_>) -> Result<(), LoggingError> {
        let entry = LogEntry::from_event(event, &self.framework, Utc::now());
        let line = entry.to_json_line()?;
        let mut writer = self.make_writer.make_writer_for(event.metadata());
        writer.write_all(&line)?;
        Ok(())
    }
}

impl<S, W> Layer<S> for JsonFileLayer<W>
where
    S: Subscriber,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // a failed write has nowhere to be reported but the log itself
        let _ = self.write_event(event);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    /// In-memory writer shared between the layer and the test body.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub(crate) fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn capture<F: FnOnce()>(f: F) -> Vec<Value> {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry()
            .with(JsonFileLayer::new(move || writer.clone(), "poem"));
        tracing::subscriber::with_default(subscriber, f);
        buf.lines()
    }

    pub(crate) fn capture_with_filter<F: FnOnce()>(filter: &str, f: F) -> Vec<Value> {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(filter))
            .with(JsonFileLayer::new(move || writer.clone(), "poem"));
        tracing::subscriber::with_default(subscriber, f);
        buf.lines()
    }

    #[test]
    fn test_app_event_gets_caller_metadata() {
        let lines = capture(|| {
            tracing::info!(request_id = "r-1", attempt = 2u64, "registry refreshed");
        });

        assert_eq!(lines.len(), 1);
        let entry = &lines[0];
        assert_eq!(entry["msg"], "registry refreshed");
        assert_eq!(entry["level"], "info");
        assert_eq!(entry["source"], "app");
        assert_eq!(entry["file"], "layer.rs");
        assert!(entry["line"].as_u64().unwrap() > 0);
        assert_eq!(entry["request_id"], "r-1");
        assert_eq!(entry["attempt"], 2);
        assert!(entry["time"].is_string());
    }

    #[test]
    fn test_framework_target_tagged_with_framework_name() {
        let lines = capture(|| {
            tracing::warn!(target: "poem::server", "listener closed");
        });

        assert_eq!(lines[0]["source"], "poem");
        assert_eq!(lines[0]["target"], "poem::server");
        assert_eq!(lines[0]["level"], "warn");
    }

    #[test]
    fn test_every_event_is_one_line() {
        let lines = capture(|| {
            tracing::debug!("first");
            tracing::error!(error = "boom", "second\nwith newline");
        });

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["msg"], "second\nwith newline");
        assert_eq!(lines[1]["error"], "boom");
    }

    #[test]
    fn test_event_fields_cannot_override_caller_metadata() {
        let lines = capture(|| {
            tracing::info!(
                file = "manifest.json",
                line = 7u64,
                source = "upstream",
                "uploaded"
            );
        });

        let entry = &lines[0];
        assert_eq!(entry["file"], "layer.rs");
        assert_ne!(entry["line"], 7);
        assert_eq!(entry["source"], "app");
        assert_eq!(entry["fields.file"], "manifest.json");
        assert_eq!(entry["fields.line"], 7);
        assert_eq!(entry["fields.source"], "upstream");
    }

    #[test]
    fn test_fields_named_like_fixed_keys_read_back() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::registry()
            .with(JsonFileLayer::new(move || writer.clone(), "poem"));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(level = "custom", time = 5u64, msg = "inner", "x");
        });

        let raw = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let entry: LogEntry = serde_json::from_str(raw.trim_end()).unwrap();
        assert_eq!(entry.level, "warn");
        assert_eq!(entry.msg, "x");
        assert_ne!(entry.time, "5");
        assert_eq!(entry.fields["fields.level"], "custom");
        assert_eq!(entry.fields["fields.time"], 5);
        assert_eq!(entry.fields["fields.msg"], "inner");
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let subscriber = tracing_subscriber::registry()
            .with(JsonFileLayer::new(|| FailingWriter, "poem"));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("dropped");
        });
    }
}
