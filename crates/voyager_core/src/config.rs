//! Process configuration resolved from environment variables.
//!
//! # Invariants
//! - Values are trimmed; blank values count as unset.
//! - Resolution never fails; unset values fall back to defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "VOYAGER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "VOYAGER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "VOYAGER_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "voyager.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `VOYAGER_DB_PATH`, `VOYAGER_LOG_LEVEL` and `VOYAGER_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            db_path: value(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: value(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_VAR, DEFAULT_DB_FILE_NAME, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(vars: &[(&str, &str)]) -> CoreConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let config = resolve(&[]);
        assert!(config.db_path.ends_with(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.log_dir, None);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn values_are_trimmed() {
        let config = resolve(&[
            (DB_PATH_VAR, "  /data/voyager.db "),
            (LOG_LEVEL_VAR, " warn "),
            (LOG_DIR_VAR, "/var/log/voyager\n"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/data/voyager.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/voyager")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = resolve(&[(DB_PATH_VAR, "   "), (LOG_DIR_VAR, "")]);
        assert_eq!(config, CoreConfig::default());
    }
}
