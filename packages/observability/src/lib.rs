//! # Observability
//!
//! Diagnostic capture for the wallet boot process.
//!
//! ## Design Philosophy
//!
//! Components are **log producers**. They use the standard `tracing` macros
//! and never talk to the capture buffer directly, except for the few places
//! that must guarantee an entry exists (the connection supervisor records its
//! failures explicitly). Everything emitted after [`install`] lands in one
//! bounded [`LogSink`] that a bug-report screen can export at any time.
//!
//! Installation tees rather than replaces: events still go to stderr (when
//! enabled) and to the optional JSONL mirror file.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     let sink = observability::install(observability::LogConfig {
//!         service_name: "wallet-boot".into(),
//!         ..Default::default()
//!     })
//!     .unwrap_or_default();
//!
//!     tracing::info!("boot started");
//!     let report = sink.snapshot().to_json();
//! }
//! ```

mod capture_layer;
mod file;
mod panic_hook;
mod sink;

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use capture_layer::{kind_for_level, CaptureLayer};
pub use file::CentralLogWriter;
pub use sink::{LogEntry, LogKind, LogPayload, LogSink, LogSnapshot, DEFAULT_CAPACITY};

/// Errors raised while installing the capture pipeline.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Another global subscriber was already set by someone else.
    #[error("a global tracing subscriber is already installed: {0}")]
    SubscriberTaken(String),
}

/// Configuration for the capture pipeline.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every mirror line.
    pub service_name: String,

    /// Level filter for the stderr tee (e.g. "debug", "info").
    /// Can be overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// Most verbose level kept in the sink and the mirror file.
    /// Independent of `default_level` and `RUST_LOG`.
    pub capture_level: Level,

    /// Entries retained in memory before oldest-first eviction.
    pub capacity: usize,

    /// Optional JSONL mirror file.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,

    /// Record panics as uncaught errors.
    pub capture_panics: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            capture_level: Level::TRACE,
            capacity: DEFAULT_CAPACITY,
            log_path: None,
            also_stderr: false,
            capture_panics: true,
        }
    }
}

static INSTALLED: OnceLock<LogSink> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// The sink installed for this process, if [`install`] has run.
pub fn installed() -> Option<LogSink> {
    INSTALLED.get().cloned()
}

/// Install the process-wide capture pipeline and return its sink.
///
/// Must run before any other subsystem so boot-time diagnostics are kept.
/// Only the first successful call installs anything; later calls return the
/// same sink and ignore their configuration. A mirror file that cannot be
/// opened only disables the mirror; the failure is captured as a warning.
pub fn install(config: LogConfig) -> Result<LogSink, SinkError> {
    let _guard = INSTALL_LOCK.lock();
    if let Some(sink) = INSTALLED.get() {
        return Ok(sink.clone());
    }

    let (mirror, mirror_error) = match &config.log_path {
        Some(path) => match CentralLogWriter::new(path) {
            Ok(writer) => (Some(writer), None),
            Err(e) => (None, Some((path.clone(), e))),
        },
        None => (None, None),
    };

    let sink = LogSink::with_capacity(config.capacity);
    let mut capture = CaptureLayer::new(sink.clone(), config.service_name.clone());
    if let Some(writer) = mirror {
        capture = capture.with_mirror(writer);
    }

    let stderr_layer = if config.also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_filter(level_filter(&config.default_level)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(capture.with_filter(LevelFilter::from_level(config.capture_level)))
        .with(stderr_layer)
        .try_init()
        .map_err(|e| SinkError::SubscriberTaken(e.to_string()))?;

    if config.capture_panics {
        panic_hook::install(sink.clone());
    }
    let sink = INSTALLED.get_or_init(|| sink).clone();

    if let Some((path, error)) = mirror_error {
        tracing::warn!(
            path = %path.display(),
            error = %error,
            "log file mirror disabled"
        );
    }
    tracing::info!(
        service = %config.service_name,
        capacity = config.capacity,
        log_path = ?config.log_path,
        "diagnostic capture installed"
    );

    Ok(sink)
}

/// Build the level filter from `RUST_LOG`, falling back to `default_level`.
fn level_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert_eq!(config.capture_level, Level::TRACE);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
        assert!(config.capture_panics);
    }

    #[test]
    fn install_is_idempotent_and_captures_events() {
        let first = install(LogConfig {
            service_name: "test".into(),
            capture_panics: false,
            ..Default::default()
        });
        // Another test binary component may have claimed the global subscriber.
        let Ok(first) = first else {
            return;
        };

        let second = install(LogConfig {
            capacity: 1,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(first.capacity(), second.capacity());
        assert!(installed().is_some());

        tracing::warn!(repeat = true, "installed twice");
        let snapshot = second.snapshot();
        assert!(snapshot.entries.iter().any(|e| e.kind == LogKind::Warn
            && e.payload
                == LogPayload::Args(vec![
                    serde_json::json!("installed twice"),
                    serde_json::json!({"repeat": true}),
                ])));
    }
}
