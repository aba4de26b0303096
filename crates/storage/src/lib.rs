//! Web Storage style key-value stores.
//!
//! This crate provides the flat string-to-string storage substrate the
//! persistent log queue is layered on:
//! - `MemoryStorage`, a quota-limited in-memory map
//! - `LocalStorage`, a shared per-origin handle onto a `MemoryStorage`
//! - `FileStorage`, a write-through store persisted as a single JSON file

pub mod file_storage;
pub mod local_storage;
pub mod memory;

pub use file_storage::FileStorage;
pub use local_storage::LocalStorage;
pub use memory::MemoryStorage;

/// Default quota for a storage area (5MB).
pub const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

/// Storage trait for localStorage-like key-value areas.
///
/// Every call completes synchronously. There are no transactions and no
/// batch atomicity: callers that need ordering guarantees must sequence
/// their writes themselves.
pub trait Storage: Send + Sync {
    /// Get the number of items in storage.
    fn length(&self) -> usize;

    /// Get the key at the given index (insertion order).
    fn key(&self, index: usize) -> Option<String>;

    /// Get the value for the given key.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value for the given key, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value for the given key. Removing an absent key is a no-op.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    /// Clear all items from storage.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Storage error.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Quota exceeded: {requested} bytes requested, quota is {quota} bytes")]
    QuotaExceeded { requested: usize, quota: usize },
    #[error("Storage is disabled")]
    Disabled,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage is corrupted: {0}")]
    Corrupted(String),
}
