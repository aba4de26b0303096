//! Memory-backed storage.

use indexmap::IndexMap;

use crate::{Storage, StorageError, DEFAULT_QUOTA};

/// Memory-backed storage implementation.
///
/// Usage is measured as the sum of key and value lengths, which is how the
/// quota is enforced.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    data: IndexMap<String, String>,
    quota: usize,
    disabled: bool,
}

impl MemoryStorage {
    /// Create a new memory storage with default quota (5MB).
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA)
    }

    /// Create with custom quota.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            data: IndexMap::new(),
            quota,
            disabled: false,
        }
    }

    pub(crate) fn from_entries(data: IndexMap<String, String>, quota: usize) -> Self {
        Self {
            data,
            quota,
            disabled: false,
        }
    }

    pub(crate) fn entries(&self) -> &IndexMap<String, String> {
        &self.data
    }

    /// Put back a value captured before a mutation that has to be undone.
    pub(crate) fn restore(&mut self, key: &str, previous: Option<String>) {
        match previous {
            Some(value) => {
                self.data.insert(key.to_string(), value);
            }
            None => {
                self.data.shift_remove(key);
            }
        }
    }

    /// Get current usage in bytes.
    pub fn usage(&self) -> usize {
        self.data.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Get the quota in bytes.
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Disable or re-enable the storage area. While disabled every mutation fails.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Disabled);
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn length(&self) -> usize {
        self.data.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.data.get_index(index).map(|(k, _)| k.clone())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;

        // An overwrite frees the old value first
        let replaced = self
            .data
            .get(key)
            .map(|old| key.len() + old.len())
            .unwrap_or(0);
        let requested = self.usage() - replaced + key.len() + value.len();
        if requested > self.quota {
            return Err(StorageError::QuotaExceeded {
                requested,
                quota: self.quota,
            });
        }

        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.data.shift_remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.data.clear();
        Ok(())
    }
}
