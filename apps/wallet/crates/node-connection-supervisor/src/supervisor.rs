//! The connection supervisor: one attempt per boot, observed through a watch channel.

use observability::{LogKind, LogPayload, LogSink};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::connector::{NodeConnector, StatusReporter};
use crate::locale;
use crate::{BootScreen, ConnectionFailure, ConnectionState, SupervisorError};

/// Drives the single bootstrap connection attempt and owns its read model.
pub struct ConnectionSupervisor {
    locale: String,
    sink: LogSink,
    server: OnceLock<String>,
    started: AtomicBool,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionSupervisor {
    /// Create an idle supervisor. Failures are recorded into `sink`.
    pub fn new(locale: impl Into<String>, sink: LogSink) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            locale: locale.into(),
            sink,
            server: OnceLock::new(),
            started: AtomicBool::new(false),
            state,
        }
    }

    /// Current read model.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Observe the read model. The receiver always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Screen the presentation layer should show right now.
    pub fn screen(&self) -> BootScreen {
        BootScreen::for_state(&self.state.borrow(), &self.default_status())
    }

    /// Localized "connecting to {server}" text for this boot.
    pub fn default_status(&self) -> String {
        let server = self.server.get().map(String::as_str).unwrap_or_default();
        locale::connecting_message(&self.locale, server)
    }

    /// Run the boot attempt against `server`.
    ///
    /// `on_status` sees every status tick in emission order until the attempt
    /// settles. A failure is recorded in the log sink, classified into the
    /// read model, and returned; it is never retried.
    pub async fn begin_attempt<C, F>(
        &self,
        server: &str,
        connector: &C,
        mut on_status: F,
    ) -> Result<(), SupervisorError>
    where
        C: NodeConnector + ?Sized,
        F: FnMut(&str),
    {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SupervisorError::AlreadyStarted);
        }

        let _ = self.server.set(server.to_string());
        let default_status = self.default_status();
        self.state.send_modify(|s| s.begin(default_status));
        info!(server = %server, locale = %self.locale, "starting node connection attempt");

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let attempt = connector.connect(server, StatusReporter::new(tx));
        tokio::pin!(attempt);

        let outcome = loop {
            tokio::select! {
                biased;
                Some(text) = rx.recv() => self.apply_status(text, &mut on_status),
                result = &mut attempt => break result,
            }
        };

        // Ticks sent before settlement are still queued; late ones are refused.
        rx.close();
        while let Ok(text) = rx.try_recv() {
            self.apply_status(text, &mut on_status);
        }

        match outcome {
            Ok(()) => {
                self.state.send_modify(ConnectionState::settle_connected);
                info!(server = %server, "node connection established");
                Ok(())
            }
            Err(failure) => {
                self.record_failure(server, &failure);
                self.state.send_modify(|s| s.settle_failed(&failure));
                Err(SupervisorError::Connection(failure))
            }
        }
    }

    fn apply_status(&self, text: String, on_status: &mut impl FnMut(&str)) {
        let mut applied = false;
        self.state.send_if_modified(|s| {
            applied = s.apply_status(&text);
            applied
        });
        if applied {
            debug!(status = %text, "connection status");
            on_status(&text);
        }
    }

    fn record_failure(&self, server: &str, failure: &ConnectionFailure) {
        self.sink.record(
            LogKind::Error,
            LogPayload::Args(vec![
                json!("node connection attempt failed:"),
                json!({
                    "server": server,
                    "failure": failure.kind_label(),
                    "reason": failure.reason(),
                    "syncError": failure.sync_error(),
                }),
            ]),
        );
    }
}
