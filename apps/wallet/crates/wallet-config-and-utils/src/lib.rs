//! Configuration, filesystem layout, and logging bootstrap for the wallet boot process.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_LOCALE, DEFAULT_LOG_CAPACITY, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
