//! Local storage logger configuration.

use queue::QueueConfig;
use serde::{Deserialize, Serialize};

/// Settings for a local storage logger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalStorageLoggerConfig {
    /// Name of the log. Must be unique for each logger sharing a storage area.
    pub log_name: String,
    /// Approximate maximum size of the log in bytes.
    pub max_log_size_in_bytes: u64,
}

impl LocalStorageLoggerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log name.
    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = log_name.into();
        self
    }

    /// Set the maximum log size.
    pub fn with_max_log_size_in_bytes(mut self, max_log_size_in_bytes: u64) -> Self {
        self.max_log_size_in_bytes = max_log_size_in_bytes;
        self
    }

    /// Settings for the queue backing the log.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::new(self.log_name.clone(), self.max_log_size_in_bytes)
    }
}

impl Default for LocalStorageLoggerConfig {
    fn default() -> Self {
        Self {
            log_name: "lsl".to_string(),
            max_log_size_in_bytes: 1024 * 1024, // 1MB
        }
    }
}
