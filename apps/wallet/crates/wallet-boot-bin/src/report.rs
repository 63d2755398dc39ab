//! Error reports: the final connection state plus everything the log sink
//! captured since boot, in one JSON document.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use node_connection_supervisor::{BootScreen, ConnectionState};
use observability::LogSnapshot;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A bug report as written to disk or stdout.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub app_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub connection: ConnectionState,
    pub screen: BootScreen,
    pub logs: LogSnapshot,
}

impl ErrorReport {
    pub fn new(
        connection: ConnectionState,
        screen: BootScreen,
        logs: LogSnapshot,
        memo: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            memo: memo.filter(|m| !m.trim().is_empty()),
            connection,
            screen,
            logs,
        }
    }

    /// `report-<timestamp>-<short id>.json`
    pub fn file_name(&self) -> String {
        let short = self.id.simple().to_string();
        format!(
            "report-{}-{}.json",
            self.created_at.format("%Y%m%dT%H%M%SZ"),
            &short[..8]
        )
    }

    /// Write the report into `dir`, creating it if needed, and return its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create report directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        Ok(path)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report {} ({})", self.id, self.created_at.to_rfc3339())?;
        writeln!(f, "wallet-boot {}", self.app_version)?;
        if let Some(memo) = &self.memo {
            writeln!(f, "Memo: {memo}")?;
        }
        writeln!(f, "Screen: {}", self.screen)?;
        writeln!(f, "Last status: {}", self.connection.status)?;
        writeln!(f)?;
        write!(f, "{}", self.logs.to_text())
    }
}
