//! Which boot screen the presentation layer should show.

use serde::Serialize;
use std::fmt;

use crate::ConnectionState;

/// Screen selected from the current [`ConnectionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum BootScreen {
    /// Still connecting; `text` is the latest status or the default message.
    Loading { text: String },
    /// The node was reached but local chain state rejected its data.
    SyncError,
    /// The node could not be reached, or failed for an unknown reason.
    InitError,
    /// Connected; the wallet UI can render.
    Ready,
}

impl BootScreen {
    /// Pick the screen for `state`, using `default_text` while no status is known.
    pub fn for_state(state: &ConnectionState, default_text: &str) -> Self {
        if state.connected {
            return Self::Ready;
        }
        if !state.api_error {
            let text = if state.status.is_empty() {
                default_text.to_string()
            } else {
                state.status.clone()
            };
            return Self::Loading { text };
        }
        match state.sync_error {
            Some(true) => Self::SyncError,
            _ => Self::InitError,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::SyncError | Self::InitError)
    }
}

impl fmt::Display for BootScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading { text } => write!(f, "{text}"),
            Self::SyncError => f.write_str(
                "Sync error: the node is reachable but its data was rejected by the local \
                 chain state. Clearing the local cache may fix this.",
            ),
            Self::InitError => f.write_str(
                "Could not connect to the API server. Check the node address or try another node.",
            ),
            Self::Ready => f.write_str("Connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AttemptPhase, ConnectionState};

    fn state(connected: bool, api_error: bool, sync_error: Option<bool>, status: &str) -> ConnectionState {
        ConnectionState {
            connected,
            api_error,
            sync_error,
            status: status.to_string(),
            phase: AttemptPhase::Attempting,
        }
    }

    #[test]
    fn loading_prefers_status_over_default() {
        let screen = BootScreen::for_state(&state(false, false, None, "verifying assets"), "default");
        assert_eq!(screen, BootScreen::Loading { text: "verifying assets".into() });

        let screen = BootScreen::for_state(&state(false, false, None, ""), "default");
        assert_eq!(screen, BootScreen::Loading { text: "default".into() });
    }

    #[test]
    fn errors_by_classification() {
        assert_eq!(
            BootScreen::for_state(&state(false, true, Some(true), ""), "d"),
            BootScreen::SyncError
        );
        assert_eq!(
            BootScreen::for_state(&state(false, true, Some(false), ""), "d"),
            BootScreen::InitError
        );
        assert_eq!(
            BootScreen::for_state(&state(false, true, None, ""), "d"),
            BootScreen::InitError
        );
    }

    #[test]
    fn connected_is_ready() {
        let screen = BootScreen::for_state(&state(true, false, None, "x"), "d");
        assert_eq!(screen, BootScreen::Ready);
        assert!(!screen.is_error());
    }

    #[test]
    fn serializes_with_screen_tag() {
        let json = serde_json::to_value(BootScreen::Loading { text: "t".into() }).unwrap();
        assert_eq!(json["screen"], "loading");
        assert_eq!(json["text"], "t");
        let json = serde_json::to_value(BootScreen::SyncError).unwrap();
        assert_eq!(json["screen"], "sync_error");
    }
}
