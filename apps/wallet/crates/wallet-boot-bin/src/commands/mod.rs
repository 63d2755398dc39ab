//! CLI command implementations.

mod config;
mod connect;

pub use config::{config_set, config_show};
pub use connect::{connect, ConnectOptions};
