//! `tracing` layer that copies every event into the [`LogSink`].
//!
//! Each event becomes one entry whose arguments are the message followed by
//! an object of the structured fields, so typed values (numbers, booleans)
//! survive until export. When a mirror file is configured the same entry is
//! appended to it as one JSON line.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::file::CentralLogWriter;
use crate::sink::{LogEntry, LogKind, LogPayload, LogSink};

/// Map a tracing level onto the capture channel it stands for.
pub fn kind_for_level(level: Level) -> LogKind {
    match level {
        Level::ERROR => LogKind::Error,
        Level::WARN => LogKind::Warn,
        Level::INFO => LogKind::Info,
        Level::DEBUG | Level::TRACE => LogKind::Log,
    }
}

/// Visitor that extracts fields from tracing events.
struct FieldVisitor {
    fields: BTreeMap<String, serde_json::Value>,
    message: Option<String>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }

    fn into_args(self) -> Vec<serde_json::Value> {
        let mut args = Vec::with_capacity(2);
        args.push(serde_json::Value::String(self.message.unwrap_or_default()));
        if !self.fields.is_empty() {
            args.push(serde_json::Value::Object(self.fields.into_iter().collect()));
        }
        args
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.insert(field, serde_json::Value::String(value_str));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match serde_json::Number::from_f64(value) {
            Some(n) => self.insert(field, serde_json::Value::Number(n)),
            None => self.insert(field, serde_json::Value::String(value.to_string())),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }
}

/// Line written to the mirror file: the captured entry plus process identity.
#[derive(serde::Serialize)]
struct MirrorLine<'a> {
    service: &'a str,
    pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<String>,
    #[serde(flatten)]
    entry: &'a LogEntry,
}

/// Layer that records every event into the sink.
pub struct CaptureLayer {
    sink: LogSink,
    service_name: String,
    pid: u32,
    mirror: Option<CentralLogWriter>,
}

impl CaptureLayer {
    pub fn new(sink: LogSink, service_name: impl Into<String>) -> Self {
        Self {
            sink,
            service_name: service_name.into(),
            pid: std::process::id(),
            mirror: None,
        }
    }

    /// Also append every captured entry to a JSONL file.
    pub fn with_mirror(mut self, writer: CentralLogWriter) -> Self {
        self.mirror = Some(writer);
        self
    }

    fn write_mirror(&self, writer: &CentralLogWriter, span: Option<String>, entry: &LogEntry) {
        let line = MirrorLine {
            service: &self.service_name,
            pid: self.pid,
            span,
            entry,
        };
        if let Ok(json) = serde_json::to_string(&line) {
            let mut writer = writer.clone();
            let _ = writeln!(writer, "{}", json);
        }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let kind = kind_for_level(*metadata.level());
        let payload = LogPayload::Args(visitor.into_args());

        match &self.mirror {
            Some(writer) => {
                let entry = self.sink.record_entry(kind, metadata.target(), payload);
                let span = ctx.event_span(event).map(|s| s.name().to_string());
                self.write_mirror(writer, span, &entry);
            }
            None => {
                self.sink.record_from(kind, metadata.target(), payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn level_mapping() {
        assert_eq!(kind_for_level(Level::ERROR), LogKind::Error);
        assert_eq!(kind_for_level(Level::WARN), LogKind::Warn);
        assert_eq!(kind_for_level(Level::INFO), LogKind::Info);
        assert_eq!(kind_for_level(Level::DEBUG), LogKind::Log);
        assert_eq!(kind_for_level(Level::TRACE), LogKind::Log);
    }

    #[test]
    fn events_are_captured_in_order_with_fields() {
        let sink = LogSink::default();
        let subscriber =
            tracing_subscriber::registry().with(CaptureLayer::new(sink.clone(), "test"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("booting");
            tracing::error!(code = 503, retry = false, "node unavailable");
            tracing::warn!(node = "node1.example.com", "slow handshake");
        });

        let snapshot = sink.snapshot();
        let kinds: Vec<LogKind> = snapshot.entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Log, LogKind::Error, LogKind::Warn]);

        assert_eq!(
            snapshot.entries[1].payload,
            LogPayload::Args(vec![
                json!("node unavailable"),
                json!({"code": 503, "retry": false}),
            ])
        );
        assert_eq!(
            snapshot.entries[0].payload,
            LogPayload::Args(vec![json!("booting")])
        );
        assert!(snapshot.entries[2]
            .target
            .as_deref()
            .is_some_and(|t| t.starts_with("observability")));
    }

    #[test]
    fn mirror_file_receives_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("boot.jsonl");
        let writer = CentralLogWriter::new(&path).unwrap();

        let sink = LogSink::default();
        let layer = CaptureLayer::new(sink.clone(), "wallet-boot").with_mirror(writer);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("mirrored");
        });

        let mut content = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let line: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(line["service"], "wallet-boot");
        assert_eq!(line["kind"], "info");
        assert_eq!(line["sequence"], 0);
        assert_eq!(line["payload"][0], "mirrored");
    }
}
