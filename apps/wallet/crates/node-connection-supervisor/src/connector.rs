//! The seam between the supervisor and the actual node transport.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ConnectionFailure;

/// An operation that reaches and validates a node.
///
/// Implementations report progress through the [`StatusReporter`] and settle
/// exactly once by returning. Reports sent after settlement are dropped.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    /// Attempt to connect to `server`. An empty `server` means "use the
    /// connector's default node".
    async fn connect(&self, server: &str, status: StatusReporter) -> Result<(), ConnectionFailure>;
}

/// Sending half of an attempt's progress channel.
///
/// Reports are delivered in the order they are made.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    tx: mpsc::UnboundedSender<String>,
}

impl StatusReporter {
    pub(crate) fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Publish one status tick. A no-op once the attempt has settled.
    pub fn report(&self, text: impl Into<String>) {
        let _ = self.tx.send(text.into());
    }

    /// True once the supervisor has stopped listening.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
