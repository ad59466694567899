//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_types::LedgerParams;

use crate::error::ServiceError;

/// Configuration for the reputation service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Ledger economy parameters.
    #[serde(default)]
    pub params: LedgerParams,

    /// Whether to run the daily pool-reset scheduler.
    #[serde(default = "default_true")]
    pub enable_scheduler: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            params: LedgerParams::default(),
            enable_scheduler: true,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        toml::from_str(&raw).map_err(|e| ServiceError::Config(e.to_string()))
    }
}
