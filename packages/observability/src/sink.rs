//! Bounded, append-only buffer of captured diagnostics.
//!
//! Every emission that reaches the sink gets the next sequence number. The
//! buffer is a ring: once `capacity` entries are held, the oldest entry is
//! evicted to make room. Sequence numbers are never reused, so an exported
//! snapshot can always be ordered and gaps reveal eviction.

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default number of entries retained before oldest-first eviction kicks in.
pub const DEFAULT_CAPACITY: usize = 2_000;

/// How long the panic path waits for the buffer lock before giving up.
const TRY_RECORD_TIMEOUT: Duration = Duration::from_millis(50);

/// Origin channel of a captured diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogKind {
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "info")]
    Info,
    /// A panic that reached the process-wide hook.
    #[serde(rename = "uncaught-error")]
    UncaughtError,
    /// A failure caught at a component boundary and reported explicitly.
    #[serde(rename = "boundary-error")]
    BoundaryError,
}

impl LogKind {
    /// Returns the canonical label written into exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Info => "info",
            Self::UncaughtError => "uncaught-error",
            Self::BoundaryError => "boundary-error",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was emitted, captured as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogPayload {
    /// Ordered arguments of a leveled message.
    Args(Vec<serde_json::Value>),
    /// An uncaught error with its source location.
    Uncaught {
        message: String,
        url: Option<String>,
        line: Option<u32>,
    },
    /// A failure caught at a boundary, with whatever context the boundary had.
    Boundary {
        error: String,
        context: Option<String>,
    },
}

impl LogPayload {
    /// Convenience for a single text argument.
    pub fn text(message: impl Into<String>) -> Self {
        Self::Args(vec![serde_json::Value::String(message.into())])
    }

    /// Render the payload on one line for text exports.
    fn render(&self) -> String {
        match self {
            Self::Args(args) => args
                .iter()
                .map(|arg| match arg {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Self::Uncaught { message, url, line } => {
                let url = url.as_deref().unwrap_or("<unknown>");
                match line {
                    Some(line) => format!("{message} ({url}:{line})"),
                    None => format!("{message} ({url})"),
                }
            }
            Self::Boundary { error, context } => match context {
                Some(context) => format!("{error} [{context}]"),
                None => error.clone(),
            },
        }
    }
}

/// One captured diagnostic emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Position in emission order. Strictly increasing, never reused.
    pub sequence: u64,
    pub kind: LogKind,
    /// RFC 3339 capture time.
    pub timestamp: String,
    /// Module path of the emitter, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub payload: LogPayload,
}

struct Buffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_sequence: u64,
    evicted: u64,
}

impl Buffer {
    fn push(&mut self, kind: LogKind, target: Option<String>, payload: LogPayload) -> &LogEntry {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }

        self.entries.push_back(LogEntry {
            sequence,
            kind,
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            target,
            payload,
        });
        &self.entries[self.entries.len() - 1]
    }
}

/// Handle to the shared capture buffer.
///
/// Cloning is cheap; every clone appends to and reads from the same buffer.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<Buffer>>,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.inner.lock();
        f.debug_struct("LogSink")
            .field("len", &buffer.entries.len())
            .field("capacity", &buffer.capacity)
            .field("evicted", &buffer.evicted)
            .finish()
    }
}

impl LogSink {
    /// Create a sink that keeps at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Buffer {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                capacity,
                next_sequence: 0,
                evicted: 0,
            })),
        }
    }

    /// Append an entry and return its sequence number.
    pub fn record(&self, kind: LogKind, payload: LogPayload) -> u64 {
        self.inner.lock().push(kind, None, payload).sequence
    }

    /// Append an entry attributed to an emitting module.
    pub fn record_from(&self, kind: LogKind, target: &str, payload: LogPayload) -> u64 {
        self.inner
            .lock()
            .push(kind, Some(target.to_string()), payload)
            .sequence
    }

    /// Append an entry and hand back a copy of it, for layers that forward it.
    pub(crate) fn record_entry(&self, kind: LogKind, target: &str, payload: LogPayload) -> LogEntry {
        self.inner
            .lock()
            .push(kind, Some(target.to_string()), payload)
            .clone()
    }

    /// Record an uncaught error with its source location.
    pub fn record_uncaught(&self, message: &str, url: Option<&str>, line: Option<u32>) -> u64 {
        self.record(
            LogKind::UncaughtError,
            LogPayload::Uncaught {
                message: message.to_string(),
                url: url.map(str::to_string),
                line,
            },
        )
    }

    /// Record a failure that a component boundary caught and did not recover from.
    pub fn record_boundary_failure(&self, error: &str, context: Option<&str>) -> u64 {
        self.record(
            LogKind::BoundaryError,
            LogPayload::Boundary {
                error: error.to_string(),
                context: context.map(str::to_string),
            },
        )
    }

    /// Best-effort append used on paths that must never block or recurse,
    /// such as the panic hook. Returns `None` if the buffer is busy.
    pub fn try_record(&self, kind: LogKind, payload: LogPayload) -> Option<u64> {
        let mut buffer = self.inner.try_lock_for(TRY_RECORD_TIMEOUT)?;
        Some(buffer.push(kind, None, payload).sequence)
    }

    /// Copy the current buffer contents.
    ///
    /// The copy is taken under the lock, so it is always a consistent prefix
    /// of emission order: entries recorded afterwards are simply absent.
    pub fn snapshot(&self) -> LogSnapshot {
        let buffer = self.inner.lock();
        LogSnapshot {
            entries: buffer.entries.iter().cloned().collect(),
            evicted: buffer.evicted,
        }
    }

    /// Materialize the buffer for a report.
    pub async fn export(&self) -> LogSnapshot {
        self.snapshot()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    /// Number of entries dropped by oldest-first eviction so far.
    pub fn evicted(&self) -> u64 {
        self.inner.lock().evicted
    }
}

/// Point-in-time copy of the sink, ordered by sequence number.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogSnapshot {
    pub entries: Vec<LogEntry>,
    /// Entries that were evicted before this snapshot was taken.
    pub evicted: u64,
}

impl LogSnapshot {
    /// Serialize as a JSON document suitable for pasting into a bug report.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"entries\":[]}"))
    }

    /// One line per entry: `#seq timestamp kind target: payload`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if self.evicted > 0 {
            out.push_str(&format!("... {} earlier entries evicted\n", self.evicted));
        }
        for entry in &self.entries {
            out.push_str(&format!("#{} {} {:<14}", entry.sequence, entry.timestamp, entry.kind));
            if let Some(target) = &entry.target {
                out.push_str(&format!(" {target}:"));
            }
            out.push(' ');
            out.push_str(&entry.payload.render());
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
