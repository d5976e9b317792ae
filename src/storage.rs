//! Local key/value persistence.
//!
//! [`Storage`] mirrors the shape of a browser's local storage: string values
//! under string keys. [`FileStorage`] keeps one JSON file per key inside a data
//! directory and replaces it atomically. [`MemoryStorage`] is used in tests and
//! can be told to refuse writes.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Key the task collection is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "tasks";

const TMP_SUFFIX: &str = ".tmp";

pub trait Storage {
    /// Returns the stored value, or `None` if nothing was ever written under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json{TMP_SUFFIX}"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path, source }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp_path = self.tmp_path_for(key);
        let write_err = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let mut tmp_file = File::create(&tmp_path).map_err(write_err)?;
        tmp_file.write_all(value.as_bytes()).map_err(write_err)?;
        tmp_file.sync_all().map_err(write_err)?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    read_only: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    /// Makes every subsequent `set_item` fail with [`StorageError::ReadOnly`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.items.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.get_item("tasks").unwrap().is_none());
    }

    #[test]
    fn file_storage_round_trips_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));
        storage.set_item("tasks", "[]").unwrap();
        storage.set_item("tasks", "[1]").unwrap();

        assert_eq!(storage.get_item("tasks").unwrap().as_deref(), Some("[1]"));
        assert!(storage.path_for("tasks").exists());
        assert!(!storage.tmp_path_for("tasks").exists());
    }

    #[test]
    fn file_storage_read_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        // A directory where the file should be cannot be read as a string.
        fs::create_dir_all(storage.path_for("tasks")).unwrap();
        assert!(matches!(
            storage.get_item("tasks"),
            Err(StorageError::Read { .. })
        ));
    }

    #[test]
    fn memory_storage_read_only_rejects_writes() {
        let mut storage = MemoryStorage::new().with_item("tasks", "[]");
        storage.set_read_only(true);
        assert!(matches!(
            storage.set_item("tasks", "[1]"),
            Err(StorageError::ReadOnly)
        ));
        assert_eq!(storage.get_item("tasks").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.writes(), 0);
    }
}
