use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Configuration for a [`StateStore`](crate::StateStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of previous states kept for undo. `0` disables history.
    pub history_limit: usize,
    /// Whether commits produce a change report. When off, transitions carry
    /// an empty change set and commits skip the bookkeeping.
    pub record_changes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: 16,
            record_changes: true,
        }
    }
}

impl StoreConfig {
    /// No history and no change reports: the store only blends and notifies.
    pub fn minimal() -> Self {
        Self {
            history_limit: 0,
            record_changes: false,
        }
    }

    /// Parse from TOML. Missing fields take their default.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.history_limit, 16);
        assert!(c.record_changes);
    }

    #[test]
    fn minimal_config() {
        let c = StoreConfig::minimal();
        assert_eq!(c.history_limit, 0);
        assert!(!c.record_changes);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = StoreConfig::from_toml_str("history_limit = 3").unwrap();
        assert_eq!(c.history_limit, 3);
        assert!(c.record_changes);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = StoreConfig::from_toml_str("history_limit = \"many\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "history_limit = 2\nrecord_changes = false").unwrap();

        let c = StoreConfig::load(file.path()).unwrap();
        assert_eq!(
            c,
            StoreConfig {
                history_limit: 2,
                record_changes: false
            }
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
