//! File-backed storage.
//!
//! The whole storage area lives in memory and is written out as one JSON
//! object after every mutation, so a later process opening the same path sees
//! everything that was successfully written.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{MemoryStorage, Storage, StorageError, DEFAULT_QUOTA};

/// Write-through storage persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: MemoryStorage,
}

impl FileStorage {
    /// Open (or create on first write) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_with_quota(path, DEFAULT_QUOTA)
    }

    /// Open the storage file with a custom quota.
    pub fn open_with_quota(path: impl Into<PathBuf>, quota: usize) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = Self::load(&path)?;

        Ok(Self {
            path,
            data: MemoryStorage::from_entries(entries, quota),
        })
    }

    fn load(path: &Path) -> Result<IndexMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(IndexMap::new());
        }

        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| StorageError::Corrupted(format!("{}: {}", path.display(), e)))
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = serde_json::to_string(self.data.entries())
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Get the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get current usage in bytes.
    pub fn usage(&self) -> usize {
        self.data.usage()
    }
}

impl Storage for FileStorage {
    fn length(&self) -> usize {
        self.data.length()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.data.key(index)
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.data.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.data.get_item(key)?;
        self.data.set_item(key, value)?;

        // Memory must not run ahead of the file
        if let Err(err) = self.persist() {
            self.data.restore(key, previous);
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let previous = match self.data.get_item(key)? {
            Some(value) => value,
            None => return Ok(()),
        };
        self.data.remove_item(key)?;

        if let Err(err) = self.persist() {
            self.data.restore(key, Some(previous));
            return Err(err);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let previous = self.data.clone();
        self.data.clear()?;

        if let Err(err) = self.persist() {
            self.data = previous;
            return Err(err);
        }
        Ok(())
    }
}
