//! Runtime configuration and balance-table loading.
//!
//! Balance tables ship with compiled defaults; operators can override them
//! with a RON file so combat numbers are tunable without a rebuild.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use combat_core::BalanceTables;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Top-level runtime settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Balance-table override file (RON). Compiled defaults when absent.
    pub tables_path: Option<PathBuf>,
    /// Event bus capacity override.
    pub event_capacity: Option<usize>,
}

impl RuntimeConfig {
    /// Resolve the balance tables, reading the override file when set.
    pub fn balance_tables(&self) -> Result<BalanceTables, ConfigError> {
        match &self.tables_path {
            Some(path) => load_balance_tables(path),
            None => Ok(BalanceTables::default()),
        }
    }
}

/// Load balance tables from a RON file.
///
/// Fields omitted from the file keep their compiled defaults, so an
/// override file only needs to name the values it changes.
pub fn load_balance_tables(path: &Path) -> Result<BalanceTables, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_override_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(round_interval_ms: 1500, wound_threshold: 5)").unwrap();

        let tables = load_balance_tables(file.path()).unwrap();
        assert_eq!(tables.round_interval_ms, 1_500);
        assert_eq!(tables.wound_threshold, 5);
        assert_eq!(
            tables.fatigue_recovery_per_round,
            BalanceTables::default().fatigue_recovery_per_round
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        let error = load_balance_tables(Path::new("/nonexistent/tables.ron")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(round_interval_ms: \"soon\")").unwrap();

        let error = load_balance_tables(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}
