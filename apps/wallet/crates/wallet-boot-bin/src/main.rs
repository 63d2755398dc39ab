//! wallet-boot - reach a node before the wallet UI starts, and keep the
//! diagnostics needed to report why it did not.

mod commands;
mod output;
mod report;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, warn};
use wallet_config_and_utils::{init_logging, Config, Paths};

/// wallet-boot - Connect to a node and report what happened.
#[derive(Parser)]
#[command(name = "wallet-boot")]
#[command(about = "Bootstrap connection check for the wallet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Echo captured diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base directory for config, logs and reports
    #[arg(long, env = "WALLETBOOT_HOME", global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the configured node (default)
    Connect(ConnectArgs),

    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Default)]
struct ConnectArgs {
    /// Node address (ws://, wss://, or host[:port]); empty selects the default node
    #[arg(long)]
    node: Option<String>,

    /// Locale for status text
    #[arg(long)]
    locale: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Write an error report if the connection fails
    #[arg(long)]
    report_on_failure: bool,

    /// Directory for the error report, or "-" for stdout
    #[arg(long, requires = "report_on_failure")]
    report_dir: Option<PathBuf>,

    /// Free-text note attached to the error report
    #[arg(long, requires = "report_on_failure")]
    memo: Option<String>,
}

impl From<ConnectArgs> for commands::ConnectOptions {
    fn from(args: ConnectArgs) -> Self {
        Self {
            node: args.node,
            locale: args.locale,
            timeout_ms: args.timeout_ms,
            report_on_failure: args.report_on_failure,
            report_dir: args.report_dir,
            memo: args.memo,
        }
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Persist a setting to the config file
    Set {
        /// Setting name (e.g. active_node, locale, log_level)
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let paths = match &cli.base_dir {
        Some(dir) => Ok(Paths::with_base_dir(dir.clone())),
        None => Paths::new(),
    };
    let paths = match paths {
        Ok(paths) => paths,
        Err(e) => {
            output::print_error(&e.to_string(), &cli.format);
            std::process::exit(1);
        }
    };

    // Capture must start before anything else can log.
    let loaded = Config::load(&paths);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    let sink = match init_logging(&config, &paths, cli.verbose) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Warning: diagnostic capture degraded: {}", e);
            observability::installed().unwrap_or_default()
        }
    };

    if let Err(e) = &loaded {
        warn!(error = %e, path = %paths.config_file().display(), "config not loaded");
        output::print_error(&e.to_string(), &cli.format);
        std::process::exit(1);
    }
    debug!(base_dir = %paths.base_dir().display(), "configuration loaded");

    let result = match cli.command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => commands::config_show(&config, &paths, &cli.format),
            ConfigCommands::Set { key, value } => {
                commands::config_set(&key, &value, &paths, &cli.format)
            }
        },
        Some(Commands::Connect(args)) => {
            commands::connect(args.into(), &config, &paths, sink, &cli.format).await
        }
        None => {
            commands::connect(
                ConnectArgs::default().into(),
                &config,
                &paths,
                sink,
                &cli.format,
            )
            .await
        }
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), &cli.format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn connect_flags_parse() {
        let cli = Cli::try_parse_from([
            "wallet-boot",
            "--format",
            "json",
            "connect",
            "--node",
            "wss://node1.example.com/ws",
            "--report-on-failure",
            "--memo",
            "stuck on splash",
        ])
        .unwrap();

        assert_eq!(cli.format, output::OutputFormat::Json);
        let Some(Commands::Connect(args)) = cli.command else {
            panic!("expected connect");
        };
        let options: commands::ConnectOptions = args.into();
        assert_eq!(options.node.as_deref(), Some("wss://node1.example.com/ws"));
        assert!(options.report_on_failure);
        assert_eq!(options.memo.as_deref(), Some("stuck on splash"));
    }

    #[test]
    fn memo_requires_report_flag() {
        assert!(Cli::try_parse_from(["wallet-boot", "connect", "--memo", "x"]).is_err());
    }

    #[test]
    fn no_subcommand_defaults_to_connect() {
        let cli = Cli::try_parse_from(["wallet-boot"]).unwrap();
        assert!(cli.command.is_none());
    }
}
