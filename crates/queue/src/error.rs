//! Queue error types.

use storage::StorageError;
use thiserror::Error;

/// Errors raised by the queue and its bookkeeping.
#[derive(Error, Debug)]
pub enum QueueError {
    /// A single value is bigger than the whole queue. The queue is left as it was.
    #[error("Value is too big to store: {size} bytes exceeds the {max} byte limit")]
    ItemTooLarge { size: u64, max: u64 },

    #[error("Failed to read '{key}' from storage: {source}")]
    StorageRead { key: String, source: StorageError },

    #[error("Failed to write '{key}' to storage: {source}")]
    StorageWrite { key: String, source: StorageError },

    #[error("Failed to deserialize '{key}': {source}")]
    Deserialization {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize value: {0}")]
    Serialization(#[source] serde_json::Error),
}

pub type QueueResult<T> = Result<T, QueueError>;

impl QueueError {
    pub(crate) fn read(key: &str, source: StorageError) -> Self {
        Self::StorageRead {
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn write(key: &str, source: StorageError) -> Self {
        Self::StorageWrite {
            key: key.to_string(),
            source,
        }
    }

    pub(crate) fn deserialization(key: &str, source: serde_json::Error) -> Self {
        Self::Deserialization {
            key: key.to_string(),
            source,
        }
    }

    /// Whether the backing storage itself failed.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageRead { .. } | Self::StorageWrite { .. })
    }
}
