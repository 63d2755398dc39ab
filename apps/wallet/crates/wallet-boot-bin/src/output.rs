//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", value),
        },
    }
}

/// Print one status tick as it arrives.
pub fn print_status(text: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("  .. {}", text),
        OutputFormat::Json => println!("{}", serde_json::json!({ "status": text })),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "status": "error", "message": message }));
        }
    }
}

/// Format a table row.
pub fn row(label: &str, value: &str) -> String {
    format!("  {:<16} {}", format!("{}:", label), value)
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    println!("{}", "-".repeat(50));
}
