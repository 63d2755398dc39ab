//! Configuration commands.

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use node_connection_supervisor::DEFAULT_NODE;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use wallet_config_and_utils::{Config, Paths};

/// Effective configuration together with the files it relates to.
#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    #[serde(flatten)]
    config: &'a Config,
    config_file: PathBuf,
    log_file: PathBuf,
    reports_dir: PathBuf,
}

impl fmt::Display for ConfigView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = if self.config.active_node.is_empty() {
            format!("{DEFAULT_NODE} (default)")
        } else {
            self.config.active_node.clone()
        };
        writeln!(f, "{}", output::row("Node", &node))?;
        writeln!(f, "{}", output::row("Locale", &self.config.locale))?;
        writeln!(f, "{}", output::row("Log level", &self.config.log_level))?;
        writeln!(
            f,
            "{}",
            output::row("Log capacity", &self.config.log_capacity.to_string())
        )?;
        writeln!(
            f,
            "{}",
            output::row(
                "Connect timeout",
                &format!("{}ms", self.config.connect_timeout_ms)
            )
        )?;
        let log_file = if self.config.log_to_file {
            self.log_file.display().to_string()
        } else {
            "off".to_string()
        };
        writeln!(f, "{}", output::row("Log file", &log_file))?;
        writeln!(
            f,
            "{}",
            output::row("Config file", &self.config_file.display().to_string())
        )?;
        write!(
            f,
            "{}",
            output::row("Reports", &self.reports_dir.display().to_string())
        )
    }
}

/// Show the effective configuration.
pub fn config_show(config: &Config, paths: &Paths, format: &OutputFormat) -> Result<()> {
    let view = ConfigView {
        config,
        config_file: paths.config_file(),
        log_file: paths.log_file(),
        reports_dir: paths.reports_dir(),
    };
    if *format == OutputFormat::Text {
        output::print_heading("wallet-boot configuration");
    }
    output::print(&view, format);
    Ok(())
}

/// Persist one setting to the config file.
///
/// Starts from the file contents, not the effective configuration, so
/// environment overrides are never written back.
pub fn config_set(key: &str, value: &str, paths: &Paths, format: &OutputFormat) -> Result<()> {
    let path = paths.config_file();
    let mut config = if path.exists() {
        Config::load_from_file(&path)?
    } else {
        Config::default()
    };

    config.set(key, value)?;
    config
        .save(paths)
        .with_context(|| format!("failed to save {}", path.display()))?;

    tracing::info!(key = %key, value = %value, "config updated");
    match format {
        OutputFormat::Text => println!("Set {} = {}", key, value),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "status": "success", "key": key, "value": value })
        ),
    }
    Ok(())
}
