//! localStorage implementation.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::{MemoryStorage, Storage, StorageError};

/// localStorage for one origin.
///
/// Cloning the handle does not copy the data: every clone reads and writes
/// the same storage area, the way every script on a page sees the same
/// `window.localStorage`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    storage: Arc<RwLock<MemoryStorage>>,
    origin: String,
}

impl LocalStorage {
    /// Create a new localStorage for an origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_storage(origin, MemoryStorage::new())
    }

    /// Create a localStorage with a custom quota.
    pub fn with_quota(origin: impl Into<String>, quota: usize) -> Self {
        Self::with_storage(origin, MemoryStorage::with_quota(quota))
    }

    /// Wrap an existing storage area.
    pub fn with_storage(origin: impl Into<String>, storage: MemoryStorage) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
            origin: origin.into(),
        }
    }

    /// Get the origin.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Get current usage in bytes.
    pub fn usage(&self) -> usize {
        self.storage.read().usage()
    }

    /// Disable or re-enable the underlying storage area for every handle.
    pub fn set_disabled(&self, disabled: bool) {
        self.storage.write().set_disabled(disabled);
    }
}

impl Storage for LocalStorage {
    fn length(&self) -> usize {
        self.storage.read().length()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.storage.read().key(index)
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.read().get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.write().set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.write().remove_item(key)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.write().clear()
    }
}
