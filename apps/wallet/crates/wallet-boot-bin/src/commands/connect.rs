//! The boot connection attempt.

use crate::output::{self, OutputFormat};
use crate::report::ErrorReport;
use anyhow::Result;
use node_connection_supervisor::{
    locale, BootScreen, ConnectionState, ConnectionSupervisor, TcpProbeConnector,
};
use observability::LogSink;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use wallet_config_and_utils::{Config, Paths};

/// Flags of `wallet-boot connect`. Unset fields fall back to the config.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub node: Option<String>,
    pub locale: Option<String>,
    pub timeout_ms: Option<u64>,
    pub report_on_failure: bool,
    /// Where to write the report; `-` prints it to stdout.
    pub report_dir: Option<PathBuf>,
    pub memo: Option<String>,
}

/// Final result printed after the attempt settles.
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    server: &'a str,
    screen: &'a BootScreen,
    state: &'a ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
}

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.screen)?;
        let server = if self.server.is_empty() {
            "(default node)"
        } else {
            self.server
        };
        writeln!(f, "{}", output::row("Server", server))?;
        writeln!(f, "{}", output::row("Last status", &self.state.status))?;
        if let Some(sync) = self.state.sync_error {
            writeln!(f, "{}", output::row("Sync error", &sync.to_string()))?;
        }
        if let Some(report) = &self.report {
            writeln!(f, "{}", output::row("Report", report))?;
        }
        Ok(())
    }
}

/// Run the single boot attempt and print its progress and outcome.
///
/// Returns an error when the node could not be reached, after the failure
/// screen (and the report, if requested) has been printed.
pub async fn connect(
    options: ConnectOptions,
    config: &Config,
    paths: &Paths,
    sink: LogSink,
    format: &OutputFormat,
) -> Result<()> {
    let server = options
        .node
        .clone()
        .unwrap_or_else(|| config.active_node.clone());
    let locale = options.locale.clone().unwrap_or_else(|| config.locale.clone());
    if !locale::is_supported(&locale) {
        warn!(locale = %locale, "unsupported locale, falling back to English text");
    }
    let timeout = Duration::from_millis(options.timeout_ms.unwrap_or(config.connect_timeout_ms));

    let supervisor = ConnectionSupervisor::new(locale.as_str(), sink.clone());
    let connector = TcpProbeConnector::new(timeout);

    if *format == OutputFormat::Text {
        println!("{}", locale::connecting_message(&locale, &server));
    }

    let result = supervisor
        .begin_attempt(&server, &connector, |status| {
            output::print_status(status, format)
        })
        .await;

    let state = supervisor.state();
    let screen = supervisor.screen();

    let failure = match result {
        Ok(()) => {
            info!(server = %server, "boot connection ready");
            output::print(
                &Outcome {
                    server: &server,
                    screen: &screen,
                    state: &state,
                    report: None,
                },
                format,
            );
            return Ok(());
        }
        Err(e) => e,
    };

    let report = if options.report_on_failure {
        let report = ErrorReport::new(
            state.clone(),
            screen.clone(),
            sink.export().await,
            options.memo.clone(),
        );
        match emit_report(&report, &options, paths, format) {
            Ok(location) => Some(location),
            Err(e) => {
                // The failure itself still gets printed below.
                sink.record_boundary_failure(&format!("{e:#}"), Some("error report"));
                warn!(error = %e, "error report not written");
                output::print_error(&format!("{e:#}"), format);
                None
            }
        }
    } else {
        None
    };

    output::print(
        &Outcome {
            server: &server,
            screen: &screen,
            state: &state,
            report,
        },
        format,
    );

    Err(failure.into())
}

/// Write the report where requested and return a description of where it went.
fn emit_report(
    report: &ErrorReport,
    options: &ConnectOptions,
    paths: &Paths,
    format: &OutputFormat,
) -> Result<String> {
    match options.report_dir.as_deref() {
        Some(dir) if dir.as_os_str() == "-" => {
            output::print(report, format);
            Ok("stdout".to_string())
        }
        dir => {
            let dir = dir.map(PathBuf::from).unwrap_or_else(|| paths.reports_dir());
            let path = report.write_to(&dir)?;
            info!(path = %path.display(), id = %report.id, "error report written");
            Ok(path.display().to_string())
        }
    }
}
