//! Environment-driven dispatcher configuration.
//!
//! # Responsibility
//! - Resolve the database location, delete policy and logging settings.
//!
//! # Invariants
//! - Blank variables behave exactly like unset ones.
//! - Resolution never touches the filesystem.

use employee_core::{default_log_level, DeletePolicy};
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "EMPLOYEE_DB_PATH";
pub const DELETE_POLICY_VAR: &str = "EMPLOYEE_DELETE_POLICY";
pub const LOG_LEVEL_VAR: &str = "EMPLOYEE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "EMPLOYEE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "employee_management.sqlite3";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported EMPLOYEE_DELETE_POLICY `{0}`; expected soft|hard")]
    UnsupportedDeletePolicy(String),
}

/// Settings shared by every dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub delete_policy: DeletePolicy,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            delete_policy: DeletePolicy::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(policy) = value(DELETE_POLICY_VAR) {
            config.delete_policy = parse_delete_policy(&policy)?;
        }
        if let Some(level) = value(LOG_LEVEL_VAR) {
            config.log_level = level;
        }
        config.log_dir = value(LOG_DIR_VAR).map(PathBuf::from);

        Ok(config)
    }
}

fn parse_delete_policy(value: &str) -> Result<DeletePolicy, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "soft" => Ok(DeletePolicy::Soft),
        "hard" => Ok(DeletePolicy::Hard),
        _ => Err(ConfigError::UnsupportedDeletePolicy(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, ConfigError, DB_PATH_VAR, DELETE_POLICY_VAR, LOG_DIR_VAR};
    use employee_core::DeletePolicy;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn unset_and_blank_values_use_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[(DB_PATH_VAR, "   ")])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert!(config.db_path.ends_with("employee_management.sqlite3"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, " /data/employees.db "),
            (DELETE_POLICY_VAR, "HARD"),
            (LOG_DIR_VAR, "/var/log/employees"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/employees.db"));
        assert_eq!(config.delete_policy, DeletePolicy::Hard);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/employees")));
    }

    #[test]
    fn unknown_delete_policy_is_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[(DELETE_POLICY_VAR, "shred")])).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedDeletePolicy("shred".to_string()));
    }
}
