// ⚙️ Configuration - JSON file with defaults and an env override

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::DEFAULT_CREDENTIAL_KEY;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "gesture-lock.json";

/// Overrides `database_path` when set
pub const DB_PATH_ENV: &str = "GESTURE_LOCK_DB";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// SQLite file holding the credential
    pub database_path: PathBuf,

    /// Store key for the credential
    pub credential_key: String,

    /// Surface units per cell diameter for the terminal widget
    pub cell_diameter: f64,

    /// Log file; logging is off when unset
    pub log_path: Option<PathBuf>,

    /// `tracing` filter directive used when `RUST_LOG` is absent
    pub log_filter: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        LockConfig {
            database_path: PathBuf::from("gesture-lock.db"),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            cell_diameter: 4.0,
            log_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl LockConfig {
    /// Parse a config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: LockConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given (it must exist), otherwise the default file when
    /// present, otherwise built-in defaults. `GESTURE_LOCK_DB` wins last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => LockConfig::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    LockConfig::from_file(default_path)?
                } else {
                    LockConfig::default()
                }
            }
        };

        if let Some(db_path) = std::env::var_os(DB_PATH_ENV) {
            config.database_path = PathBuf::from(db_path);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cell_diameter.is_finite() || self.cell_diameter <= 0.0 {
            anyhow::bail!("cell_diameter must be a positive number, got {}", self.cell_diameter);
        }
        if self.credential_key.is_empty() {
            anyhow::bail!("credential_key must not be empty");
        }
        Ok(())
    }
}
