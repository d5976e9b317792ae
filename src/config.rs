//! Configuration loading.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, and command-line overrides applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::storage::DEFAULT_KEY;

const APP_DIR: &str = "taskboard";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "taskboard.log";

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub storage_key: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, treating a missing file as empty.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub log_file: PathBuf,
}

impl Config {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR}")))
    }

    /// Resolves a config from file values, falling back to defaults.
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let data_dir = file.data_dir.unwrap_or_else(Self::default_data_dir);
        let storage_key = file.storage_key.unwrap_or_else(|| DEFAULT_KEY.to_string());
        validate_key(&storage_key)?;
        let log_file = file.log_file.unwrap_or_else(|| data_dir.join(LOG_FILE));
        Ok(Self {
            data_dir,
            storage_key,
            log_file,
        })
    }
}

/// Storage keys become file names, so they must be a single path component.
pub fn validate_key(key: &str) -> Result<(), ConfigError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "storage_key".to_string(),
            reason: format!("{key:?} must be non-empty and use only letters, digits, '-' or '_'"),
        })
    }
}
