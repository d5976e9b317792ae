//! Error types for the storage, store and configuration layers.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing the persistent key/value storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage is read-only")]
    ReadOnly,
}

/// Errors returned by [`crate::task_store::TaskStore`] mutators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(String),

    /// The in-memory change was applied but could not be written out.
    #[error("could not save tasks: {0}")]
    Persist(#[from] StorageError),

    #[error("could not serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the collection itself is fine and only the write failed.
    pub fn is_persist(&self) -> bool {
        matches!(self, StoreError::Persist(_) | StoreError::Serialize(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}
