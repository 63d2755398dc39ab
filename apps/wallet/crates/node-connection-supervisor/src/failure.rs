//! Failure taxonomy for connection attempts.

use thiserror::Error;

/// Marker that transports which only report text use for chain-state rejections.
pub const SYNC_ERROR_MARKER: &str = "ChainStore sync error";

/// Why a connection attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// The node could not be reached, or answered with a non-semantic error.
    #[error("node unreachable: {0}")]
    Unreachable(String),

    /// The node answered, but local chain-state bookkeeping rejected its data.
    #[error("chain sync mismatch: {0}")]
    ChainSyncMismatch(String),

    /// The connection operation failed without saying why.
    #[error("connection failed without a reason")]
    Unknown,
}

impl ConnectionFailure {
    /// Classify a failure that only arrived as text.
    ///
    /// Empty text carries no cause and maps to [`ConnectionFailure::Unknown`].
    pub fn from_message(message: &str) -> Self {
        if message.is_empty() {
            Self::Unknown
        } else if message.contains(SYNC_ERROR_MARKER) {
            Self::ChainSyncMismatch(message.to_string())
        } else {
            Self::Unreachable(message.to_string())
        }
    }

    /// Classify an optional failure value; absence means "no known cause".
    pub fn from_rejection(message: Option<&str>) -> Self {
        message.map_or(Self::Unknown, Self::from_message)
    }

    /// The `syncError` value this failure puts into the read model.
    pub fn sync_error(&self) -> Option<bool> {
        match self {
            Self::ChainSyncMismatch(_) => Some(true),
            Self::Unreachable(_) => Some(false),
            Self::Unknown => None,
        }
    }

    /// Stable label used in diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::ChainSyncMismatch(_) => "chain-sync-mismatch",
            Self::Unknown => "unknown",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unreachable(reason) | Self::ChainSyncMismatch(reason) => Some(reason),
            Self::Unknown => None,
        }
    }
}

/// Errors returned by [`crate::ConnectionSupervisor::begin_attempt`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The supervisor already ran its one attempt for this boot.
    #[error("a connection attempt was already started for this boot")]
    AlreadyStarted,

    /// The attempt ran and failed.
    #[error(transparent)]
    Connection(#[from] ConnectionFailure),
}

impl SupervisorError {
    /// The connection failure, if the attempt actually ran.
    pub fn failure(&self) -> Option<&ConnectionFailure> {
        match self {
            Self::Connection(failure) => Some(failure),
            Self::AlreadyStarted => None,
        }
    }
}
