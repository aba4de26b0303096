//! Bookkeeping for the persisted queue.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::mem;
use storage::Storage;

use crate::commit::PendingCommit;
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::index::QueueIndex;
use crate::node::Node;

/// The record stored under the queue's key prefix.
///
/// It locates the first entry and the next free position, and tracks the
/// estimated size of all stored entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookkeepingInfo {
    pub size_in_bytes: u64,
    pub start_index: QueueIndex,
    pub next_free_index: QueueIndex,
}

/// Keeps track of the start, end and size of a queue held in storage, and
/// stages node creation and removal until `store` commits them.
///
/// The in-memory record always reflects staged changes; storage only sees
/// them on `store`.
pub struct Bookkeeper<T, S> {
    config: QueueConfig,
    storage: S,
    info: BookkeepingInfo,
    // Last record known to be in storage
    committed: BookkeepingInfo,
    pending: PendingCommit,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S: Storage> Bookkeeper<T, S> {
    /// Create a bookkeeper and load the last committed record from storage.
    pub fn new(config: QueueConfig, storage: S) -> QueueResult<Self> {
        let mut bookkeeper = Self {
            config,
            storage,
            info: BookkeepingInfo::default(),
            committed: BookkeepingInfo::default(),
            pending: PendingCommit::default(),
            _marker: PhantomData,
        };
        bookkeeper.reset()?;
        Ok(bookkeeper)
    }

    /// Commit staged changes to storage.
    ///
    /// Staging is cleared whether or not the commit succeeds. After a failed
    /// commit the in-memory record still counts the staged changes, so callers
    /// `reset` to line it up with storage again.
    pub fn store(&mut self) -> QueueResult<()> {
        let pending = mem::take(&mut self.pending);
        let record = serde_json::to_string(&self.info).map_err(QueueError::Serialization)?;
        pending.apply(&mut self.storage, &self.config.key_prefix, &record)?;
        self.committed = self.info;
        Ok(())
    }

    /// Drop staged changes and reload the record last written to storage.
    ///
    /// A prefix with no record yet starts from an empty queue, and that empty
    /// record is written immediately. If the reload fails the record from the
    /// last successful commit is kept.
    pub fn reset(&mut self) -> QueueResult<()> {
        self.pending = PendingCommit::default();
        self.info = self.committed;

        let key = &self.config.key_prefix;
        match self.storage.get_item(key).map_err(|e| QueueError::read(key, e))? {
            Some(serialized) => {
                self.info = serde_json::from_str(&serialized)
                    .map_err(|e| QueueError::deserialization(key, e))?;
                self.committed = self.info;
                Ok(())
            }
            None => {
                self.info = BookkeepingInfo::default();
                self.store()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.info.start_index == self.info.next_free_index
    }

    /// Free space left under the size limit, counting staged changes.
    /// Negative once staged additions overshoot the limit.
    pub fn remaining_space(&self) -> i64 {
        let remaining =
            i128::from(self.config.max_size_in_bytes) - i128::from(self.info.size_in_bytes);
        i64::try_from(remaining).unwrap_or(if remaining < 0 { i64::MIN } else { i64::MAX })
    }

    /// Lazily walk the indices of the live entries, oldest first.
    pub fn index_values(&self) -> IndexValues {
        IndexValues {
            next: self.info.start_index,
            end: self.info.next_free_index,
        }
    }

    /// Call `visit` with each live index, oldest first.
    pub fn iterate_index_values(&self, visit: impl FnMut(QueueIndex)) {
        self.index_values().for_each(visit);
    }

    pub fn info(&self) -> &BookkeepingInfo {
        &self.info
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn pending(&self) -> &PendingCommit {
        &self.pending
    }

    /// Overwrite the tracked size. Used once eviction has passed every
    /// committed entry and only staged additions are left to count.
    pub(crate) fn set_size_in_bytes(&mut self, size_in_bytes: u64) {
        self.info.size_in_bytes = size_in_bytes;
    }
}

impl<T: Serialize, S: Storage> Bookkeeper<T, S> {
    /// Stage a new node at the end of the queue and return it.
    pub fn create_next_node(&mut self, value: T) -> QueueResult<Node<T>> {
        let node = Node::new(&self.config, self.info.next_free_index, value)?;
        self.info.next_free_index = self.info.next_free_index.next();
        self.info.size_in_bytes = self.info.size_in_bytes.saturating_add(node.estimated_size());
        self.pending.stage_add(node.entry().clone());
        Ok(node)
    }
}

impl<T: DeserializeOwned, S: Storage> Bookkeeper<T, S> {
    /// Stage removal of the first stored node and return it.
    ///
    /// The node is read from storage, never from staged additions. An absent
    /// entry is stepped over and reported as `None`. Callers must check
    /// `is_empty` first.
    pub fn delete_first_node(&mut self) -> QueueResult<Option<Node<T>>> {
        let node = Node::load(&self.config, self.info.start_index, &self.storage)?;
        self.info.start_index = self.info.start_index.next();
        if let Some(node) = &node {
            self.info.size_in_bytes = self.info.size_in_bytes.saturating_sub(node.estimated_size());
            self.pending.stage_remove(node.entry().clone());
        }
        if self.is_empty() {
            self.info.size_in_bytes = 0;
        }
        Ok(node)
    }
}

/// Iterator over the live indices of a queue.
#[derive(Clone, Debug)]
pub struct IndexValues {
    next: QueueIndex,
    end: QueueIndex,
}

impl Iterator for IndexValues {
    type Item = QueueIndex;

    fn next(&mut self) -> Option<QueueIndex> {
        if self.next == self.end {
            return None;
        }
        let index = self.next;
        self.next = index.next();
        Some(index)
    }
}
