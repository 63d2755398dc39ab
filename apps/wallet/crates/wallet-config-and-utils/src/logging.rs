//! Logging initialization for the boot process.
//!
//! Installs the observability capture pipeline. This must be the first thing
//! `main` does so diagnostics emitted while loading configuration are kept.

use crate::{Config, Paths};
use observability::{LogConfig, LogSink, SinkError};

/// Install diagnostic capture for the boot process.
///
/// - captured entries kept in memory, bounded by `config.log_capacity`
/// - every level captured; stderr filtered by `RUST_LOG` or `config.log_level`
/// - optional JSONL mirror at `paths.log_file()` when `config.log_to_file`
///   or `WALLETBOOT_LOG_FILE` is set
/// - stderr output when `also_stderr`
pub fn init_logging(config: &Config, paths: &Paths, also_stderr: bool) -> Result<LogSink, SinkError> {
    let mirror = config.log_to_file || env_flag("WALLETBOOT_LOG_FILE");

    observability::install(LogConfig {
        service_name: "wallet-boot".into(),
        default_level: parse_level(&config.log_level).to_string().to_lowercase(),
        capture_level: tracing::Level::TRACE,
        capacity: config.log_capacity,
        log_path: mirror.then(|| paths.log_file()),
        also_stderr,
        capture_panics: true,
    })
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
