//! Connection supervisor for the wallet boot sequence.
//!
//! Before any wallet screen is usable the client must reach a node. This
//! crate drives that single attempt:
//!
//! ```text
//! Idle ──begin_attempt──► Attempting ──Ok──► Connected
//!                             │ (status ticks)
//!                             └──Err──► Failed { api_error, sync_error }
//! ```
//!
//! The attempt itself is delegated to a [`NodeConnector`]. The supervisor
//! owns the [`ConnectionState`] read model, publishes it through a watch
//! channel, classifies failures, and records every failure in the
//! diagnostic [`observability::LogSink`] before the state turns terminal.

mod connector;
mod failure;
pub mod locale;
mod screen;
mod state;
mod supervisor;
mod tcp_probe;

pub use connector::{NodeConnector, StatusReporter};
pub use failure::{ConnectionFailure, SupervisorError, SYNC_ERROR_MARKER};
pub use screen::BootScreen;
pub use state::{AttemptPhase, ConnectionState};
pub use supervisor::ConnectionSupervisor;
pub use tcp_probe::{NodeAddress, TcpProbeConnector, DEFAULT_NODE, DEFAULT_NODE_PORT};
