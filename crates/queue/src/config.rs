//! Queue configuration.

use serde::{Deserialize, Serialize};

/// Settings for a limited-size queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Prefix for every storage key the queue owns. Must be unique per queue
    /// sharing a storage area.
    pub key_prefix: String,
    /// Rough limit on the bytes the queue may occupy. Once reached, the oldest
    /// entries are removed to make space for newer ones.
    pub max_size_in_bytes: u64,
}

impl QueueConfig {
    pub fn new(key_prefix: impl Into<String>, max_size_in_bytes: u64) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            max_size_in_bytes,
        }
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Set the size limit.
    pub fn with_max_size_in_bytes(mut self, max_size_in_bytes: u64) -> Self {
        self.max_size_in_bytes = max_size_in_bytes;
        self
    }
}
