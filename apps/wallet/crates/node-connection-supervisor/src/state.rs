//! The read model consumed by the presentation layer.

use serde::Serialize;

use crate::ConnectionFailure;

/// Where the single boot attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    Idle,
    Attempting,
    Connected,
    Failed,
}

/// Connection state as the UI sees it.
///
/// At most one of `connected` and `api_error` is ever true, and `sync_error`
/// is only set once `api_error` is. Once terminal the state never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub connected: bool,
    pub api_error: bool,
    /// `Some(true)` for chain sync failures, `Some(false)` for other known
    /// causes, `None` while unresolved or when the cause is unknown.
    pub sync_error: Option<bool>,
    /// Latest human-readable progress text.
    pub status: String,
    pub phase: AttemptPhase,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            connected: false,
            api_error: false,
            sync_error: None,
            status: String::new(),
            phase: AttemptPhase::Idle,
        }
    }
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, AttemptPhase::Connected | AttemptPhase::Failed)
    }

    pub(crate) fn begin(&mut self, default_status: String) {
        self.phase = AttemptPhase::Attempting;
        self.status = default_status;
    }

    /// Returns false, leaving the state untouched, once the attempt has settled.
    pub(crate) fn apply_status(&mut self, text: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = text.to_string();
        true
    }

    pub(crate) fn settle_connected(&mut self) {
        if self.is_terminal() {
            return;
        }
        self.connected = true;
        self.api_error = false;
        self.sync_error = None;
        self.phase = AttemptPhase::Connected;
    }

    pub(crate) fn settle_failed(&mut self, failure: &ConnectionFailure) {
        if self.is_terminal() {
            return;
        }
        self.connected = false;
        self.api_error = true;
        self.sync_error = failure.sync_error();
        self.phase = AttemptPhase::Failed;
    }
}
