//! Configuration management for the boot process.
//!
//! Values come from `~/.walletboot/config.json` (every field optional),
//! then from `WALLETBOOT_*` environment variables, then from CLI flags
//! applied by the binary.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default UI locale.
pub const DEFAULT_LOCALE: &str = "en";

/// Default number of diagnostics kept in memory.
pub const DEFAULT_LOG_CAPACITY: usize = 2_000;

/// Default time allowed for reaching the node.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Main boot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Address of the node to connect to. Empty means "use the default node".
    pub active_node: String,
    /// Locale used for user-facing status text.
    pub locale: String,
    /// Diagnostics kept in memory before the oldest are evicted.
    pub log_capacity: usize,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Mirror captured diagnostics to `logs/boot.jsonl`.
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            active_node: String::new(),
            locale: DEFAULT_LOCALE.to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            log_to_file: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Reject values that would make the boot meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if self.connect_timeout_ms == 0 {
            return Err(CoreError::Config(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(CoreError::Config("locale must not be empty".to_string()));
        }
        Ok(())
    }

    /// Update one setting by its file key, parsing `value` as needed.
    pub fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let invalid = |what: &str| CoreError::Config(format!("invalid {what} for {key}: {value:?}"));
        match key {
            "log_level" => self.log_level = value.trim().to_string(),
            "active_node" => self.active_node = value.trim().to_string(),
            "locale" => self.locale = value.trim().to_string(),
            "log_capacity" => {
                self.log_capacity = value.trim().parse().map_err(|_| invalid("number"))?
            }
            "connect_timeout_ms" => {
                self.connect_timeout_ms = value.trim().parse().map_err(|_| invalid("number"))?
            }
            "log_to_file" => {
                self.log_to_file = value.trim().parse().map_err(|_| invalid("boolean"))?
            }
            _ => return Err(CoreError::Config(format!("unknown config key: {key}"))),
        }
        self.validate()
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `WALLETBOOT_*` overrides from the given lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(log_level) = lookup("WALLETBOOT_LOG_LEVEL").and_then(non_empty) {
            self.log_level = log_level;
        }
        // An explicitly empty node is meaningful: it selects the default node.
        if let Some(node) = lookup("WALLETBOOT_NODE") {
            self.active_node = node.trim().to_string();
        }
        if let Some(locale) = lookup("WALLETBOOT_LOCALE").and_then(non_empty) {
            self.locale = locale;
        }
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
