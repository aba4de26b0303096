//! Queue entries and their storage encoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use storage::Storage;

use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::index::QueueIndex;

/// The stored form of one queue entry: its key and its JSON text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    key: String,
    serialized: String,
}

impl Entry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    /// Estimate of the bytes this entry occupies in storage.
    ///
    /// Key plus value length. The storage area's own overhead is ignored.
    pub fn estimated_size(&self) -> u64 {
        (self.serialized.len() + self.key.len()) as u64
    }

    /// Write the entry, replacing whatever is stored under its key.
    pub fn store<S: Storage + ?Sized>(&self, storage: &mut S) -> QueueResult<()> {
        storage
            .set_item(&self.key, &self.serialized)
            .map_err(|e| QueueError::write(&self.key, e))
    }

    /// Remove the entry if it exists.
    pub fn remove<S: Storage + ?Sized>(&self, storage: &mut S) -> QueueResult<()> {
        storage
            .remove_item(&self.key)
            .map_err(|e| QueueError::write(&self.key, e))
    }
}

/// One element of the queue: a value together with its stored form.
#[derive(Clone, Debug)]
pub struct Node<T> {
    index: QueueIndex,
    entry: Entry,
    value: T,
}

impl<T> Node<T> {
    /// Storage key for the entry at `index`.
    pub fn create_key(config: &QueueConfig, index: QueueIndex) -> String {
        format!("{}-item-{}", config.key_prefix, index)
    }

    pub fn index(&self) -> QueueIndex {
        self.index
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn key(&self) -> &str {
        self.entry.key()
    }

    pub fn estimated_size(&self) -> u64 {
        self.entry.estimated_size()
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Serialize> Node<T> {
    /// Build a node for `value` at `index`. Nothing is written to storage.
    pub fn new(config: &QueueConfig, index: QueueIndex, value: T) -> QueueResult<Self> {
        let serialized = serde_json::to_string(&value).map_err(QueueError::Serialization)?;
        Ok(Self {
            index,
            entry: Entry {
                key: Self::create_key(config, index),
                serialized,
            },
            value,
        })
    }
}

impl<T: DeserializeOwned> Node<T> {
    /// Read the node at `index` back from storage.
    ///
    /// Returns `Ok(None)` when nothing is stored under the key.
    pub fn load<S: Storage + ?Sized>(
        config: &QueueConfig,
        index: QueueIndex,
        storage: &S,
    ) -> QueueResult<Option<Self>> {
        let key = Self::create_key(config, index);
        let serialized = match storage.get_item(&key).map_err(|e| QueueError::read(&key, e))? {
            Some(serialized) => serialized,
            None => return Ok(None),
        };

        let value = serde_json::from_str(&serialized)
            .map_err(|e| QueueError::deserialization(&key, e))?;

        Ok(Some(Self {
            index,
            entry: Entry { key, serialized },
            value,
        }))
    }
}
