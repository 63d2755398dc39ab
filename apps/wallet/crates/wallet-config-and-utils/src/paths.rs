//! File system paths for the wallet boot process.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.walletboot)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.walletboot`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".walletboot"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.walletboot).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.walletboot/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the logs directory (~/.walletboot/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the JSONL mirror of captured diagnostics (~/.walletboot/logs/boot.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("boot.jsonl")
    }

    /// Get the directory error reports are written to (~/.walletboot/reports).
    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join("reports")
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.reports_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn paths_are_under_base_dir() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/wb"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/wb/config.json"));
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/wb/logs/boot.jsonl"));
        assert_eq!(paths.reports_dir(), PathBuf::from("/tmp/wb/reports"));
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested"));
        paths.ensure_dirs().unwrap();
        assert!(paths.logs_dir().is_dir());
        assert!(paths.reports_dir().is_dir());
    }

    #[test]
    fn default_paths_end_with_walletboot() {
        if let Ok(paths) = Paths::new() {
            assert!(paths.base_dir().ends_with(".walletboot"));
        }
    }
}
