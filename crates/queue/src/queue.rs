//! Limited-size queue.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use storage::Storage;

use crate::bookkeeper::{Bookkeeper, IndexValues};
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::node::Node;

/// A limited-size FIFO queue persisted to a storage area.
///
/// Enqueuing can remove the oldest elements to free up space. A queue built
/// over a storage area that already holds a queue under the same prefix
/// picks up where the previous one left off.
pub struct LimitedSizeQueue<T, S> {
    bookkeeper: Bookkeeper<T, S>,
}

impl<T, S> LimitedSizeQueue<T, S>
where
    T: Serialize + DeserializeOwned,
    S: Storage,
{
    /// Create or restore the queue described by `config`.
    pub fn new(config: QueueConfig, storage: S) -> QueueResult<Self> {
        Ok(Self {
            bookkeeper: Bookkeeper::new(config, storage)?,
        })
    }

    /// Add `value` at the end of the queue, evicting the oldest entries
    /// until everything fits.
    ///
    /// Fails with `ItemTooLarge` if the value could not fit even in an empty
    /// queue; the queue is left as it was. Storage failures are returned
    /// as they happen, and the queue carries on from what storage holds.
    pub fn enqueue(&mut self, value: T) -> QueueResult<()> {
        let max = self.bookkeeper.config().max_size_in_bytes;

        let (index, size) = match self.bookkeeper.create_next_node(value) {
            Ok(node) => (node.index(), node.estimated_size()),
            Err(err) => return Err(self.rollback(err)),
        };

        if size > max {
            return Err(self.rollback(QueueError::ItemTooLarge { size, max }));
        }

        while self.bookkeeper.remaining_space() < 0 {
            // Only committed entries may be evicted, never the one being added
            if self.bookkeeper.info().start_index == index {
                // Every older entry is gone, so the new one is all that is left
                self.bookkeeper.set_size_in_bytes(size);
                break;
            }
            if let Err(err) = self.bookkeeper.delete_first_node() {
                return Err(self.rollback(err));
            }
        }

        self.bookkeeper.store().map_err(|err| self.rollback(err))
    }

    /// Remove and return the oldest value, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> QueueResult<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }

        let mut value = None;
        while value.is_none() && !self.is_empty() {
            match self.bookkeeper.delete_first_node() {
                Ok(node) => value = node.map(Node::into_value),
                Err(err) => return Err(self.rollback(err)),
            }
        }
        self.bookkeeper.store().map_err(|err| self.rollback(err))?;

        Ok(value)
    }

    /// Visit every value, oldest first, without removing anything.
    pub fn iterate(&self, mut visit: impl FnMut(T)) -> QueueResult<()> {
        for value in self.iter() {
            visit(value?);
        }
        Ok(())
    }

    /// Iterate over the stored values, oldest first, without removing them.
    pub fn iter(&self) -> Iter<'_, T, S> {
        Iter {
            config: self.bookkeeper.config(),
            storage: self.bookkeeper.storage(),
            indices: self.bookkeeper.index_values(),
            _marker: PhantomData,
        }
    }

    /// Staged work is discarded so it cannot leak into a later commit, and the
    /// record is reloaded from storage. A failing reload is dropped in favour
    /// of the error that caused it.
    fn rollback(&mut self, err: QueueError) -> QueueError {
        let _ = self.bookkeeper.reset();
        err
    }
}

impl<T, S: Storage> LimitedSizeQueue<T, S> {
    pub fn is_empty(&self) -> bool {
        self.bookkeeper.is_empty()
    }

    /// Estimated bytes used by the stored entries.
    pub fn size_in_bytes(&self) -> u64 {
        self.bookkeeper.info().size_in_bytes
    }

    pub fn remaining_space(&self) -> i64 {
        self.bookkeeper.remaining_space()
    }

    pub fn config(&self) -> &QueueConfig {
        self.bookkeeper.config()
    }

    pub fn storage(&self) -> &S {
        self.bookkeeper.storage()
    }
}

impl<'a, T, S> IntoIterator for &'a LimitedSizeQueue<T, S>
where
    T: Serialize + DeserializeOwned,
    S: Storage,
{
    type Item = QueueResult<T>;
    type IntoIter = Iter<'a, T, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read-only iterator over a queue's values.
pub struct Iter<'a, T, S> {
    config: &'a QueueConfig,
    storage: &'a S,
    indices: IndexValues,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, S: Storage> Iterator for Iter<'_, T, S> {
    type Item = QueueResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.indices.next()?;
            // Absent entries are skipped
            if let Some(result) = Node::load(self.config, index, self.storage).transpose() {
                return Some(result.map(Node::into_value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::QueueIndex;
    use storage::{LocalStorage, MemoryStorage, StorageError};

    const MAX_SIZE_IN_BYTES: u64 = 100;
    const KEY_PREFIX: &str = "test-q";

    fn new_queue(storage: &LocalStorage) -> LimitedSizeQueue<String, LocalStorage> {
        LimitedSizeQueue::new(QueueConfig::new(KEY_PREFIX, MAX_SIZE_IN_BYTES), storage.clone())
            .unwrap()
    }

    fn items(queue: &LimitedSizeQueue<String, LocalStorage>) -> Vec<String> {
        queue.iter().collect::<QueueResult<Vec<_>>>().unwrap()
    }

    fn footprint(index: usize, value: &str) -> u64 {
        (format!("{}-item-{}", KEY_PREFIX, index).len() + value.len() + 2) as u64
    }

    #[test]
    fn test_fifo() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);

        queue.enqueue("foo".to_string()).unwrap();
        queue.enqueue("bar".to_string()).unwrap();

        assert_eq!(queue.dequeue().unwrap(), Some("foo".to_string()));
        assert_eq!(items(&queue), vec!["bar"]);
    }

    #[test]
    fn test_dequeue_all_in_order() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        let values = ["1", "2", "3", "4"];

        for value in values {
            queue.enqueue(value.to_string()).unwrap();
        }

        let mut out = Vec::new();
        while let Some(value) = queue.dequeue().unwrap() {
            out.push(value);
        }
        assert_eq!(out, values);
    }

    #[test]
    fn test_iterate_is_non_destructive() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        queue.enqueue("bar".to_string()).unwrap();

        let mut first = Vec::new();
        queue.iterate(|item| first.push(item)).unwrap();
        let second = items(&queue);

        assert_eq!(first, vec!["foo", "bar"]);
        assert_eq!(second, first);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_auto_dequeue_when_full() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        let enqueued: Vec<String> = (0..26).map(|i| i.to_string()).collect();

        for item in &enqueued {
            queue.enqueue(item.clone()).unwrap();
        }
        let stored = items(&queue);

        assert!(stored.len() < enqueued.len());
        assert_eq!(stored, enqueued[enqueued.len() - stored.len()..]);
        assert!(queue.remaining_space() >= 0);
    }

    #[test]
    fn test_eviction_keeps_largest_fitting_suffix() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        let values: Vec<String> = [1, 20, 2, 10, 1, 30, 1]
            .iter()
            .zip('a'..)
            .map(|(len, c)| c.to_string().repeat(*len))
            .collect();

        for value in &values {
            queue.enqueue(value.clone()).unwrap();
        }

        // The newest entries whose footprints add up to no more than the limit
        let mut total = 0;
        let mut keep = 0;
        for (index, value) in values.iter().enumerate().rev() {
            total += footprint(index, value);
            if total > MAX_SIZE_IN_BYTES {
                break;
            }
            keep += 1;
        }

        assert_eq!(items(&queue), values[values.len() - keep..]);
        assert_eq!(queue.size_in_bytes(), {
            let first = values.len() - keep;
            (first..values.len()).map(|i| footprint(i, &values[i])).sum::<u64>()
        });
    }

    #[test]
    fn test_is_empty() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        assert!(queue.is_empty());

        queue.enqueue("foo".to_string()).unwrap();
        assert!(!queue.is_empty());

        queue.dequeue().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_is_empty_tracks_positions_not_size() {
        // A non-empty queue must never report empty just because it holds bytes
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();

        assert!(queue.size_in_bytes() > 0);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_dequeue_empty_returns_none() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        assert_eq!(queue.dequeue().unwrap(), None);
    }

    #[test]
    fn test_dequeue_distinguishes_falsy_values() {
        let storage = LocalStorage::new("test");
        let mut queue: LimitedSizeQueue<Option<u32>, _> =
            LimitedSizeQueue::new(QueueConfig::new(KEY_PREFIX, MAX_SIZE_IN_BYTES), storage).unwrap();

        queue.enqueue(None).unwrap();
        queue.enqueue(Some(0)).unwrap();

        assert_eq!(queue.dequeue().unwrap(), Some(None));
        assert_eq!(queue.dequeue().unwrap(), Some(Some(0)));
        assert_eq!(queue.dequeue().unwrap(), None);
    }

    #[test]
    fn test_oversized_item_is_rejected_and_rolled_back() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        let before = storage.get_item(KEY_PREFIX).unwrap();

        let err = queue.enqueue("x".repeat(100)).unwrap_err();

        assert!(matches!(err, QueueError::ItemTooLarge { size: 115, max: 100 }));
        assert_eq!(items(&queue), vec!["foo"]);
        assert_eq!(storage.get_item(KEY_PREFIX).unwrap(), before);
        assert_eq!(storage.get_item("test-q-item-1").unwrap(), None);

        // The freed position is reused
        queue.enqueue("bar".to_string()).unwrap();
        assert_eq!(items(&queue), vec!["foo", "bar"]);
    }

    #[test]
    fn test_item_filling_whole_queue_evicts_everything_else() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();

        // 13 byte key + 2 quotes + 85 characters = exactly the limit
        let big = "y".repeat(85);
        queue.enqueue(big.clone()).unwrap();

        assert_eq!(items(&queue), vec![big]);
        assert_eq!(queue.remaining_space(), 0);
    }

    #[test]
    fn test_restores_from_storage() {
        let storage = LocalStorage::new("test");
        let before = {
            let mut queue = new_queue(&storage);
            queue.enqueue("foo".to_string()).unwrap();
            queue.enqueue("bar".to_string()).unwrap();
            queue.enqueue("baz".to_string()).unwrap();
            queue.dequeue().unwrap();
            items(&queue)
        };

        let queue = new_queue(&storage);
        assert_eq!(items(&queue), before);
        assert_eq!(queue.size_in_bytes(), 36);
    }

    #[test]
    fn test_prefixes_are_independent() {
        let storage = LocalStorage::new("test");
        let mut first = new_queue(&storage);
        let mut second: LimitedSizeQueue<String, _> =
            LimitedSizeQueue::new(QueueConfig::new("other-q", 100), storage.clone()).unwrap();

        first.enqueue("foo".to_string()).unwrap();
        second.enqueue("bar".to_string()).unwrap();

        assert_eq!(items(&first), vec!["foo"]);
        assert_eq!(second.iter().collect::<QueueResult<Vec<_>>>().unwrap(), vec!["bar"]);
    }

    #[test]
    fn test_order_survives_index_wrap() {
        let mut storage = LocalStorage::new("test");
        let start = QueueIndex::MODULUS - 2;
        let record = format!(
            r#"{{"sizeInBytes":0,"startIndex":{0},"nextFreeIndex":{0}}}"#,
            start
        );
        storage.set_item(KEY_PREFIX, &record).unwrap();

        let mut queue = new_queue(&storage);
        for value in ["a", "b", "c", "d"] {
            queue.enqueue(value.to_string()).unwrap();
        }

        assert_eq!(items(&queue), vec!["a", "b", "c", "d"]);
        assert!(storage.get_item("test-q-item-0").unwrap().is_some());
        assert_eq!(queue.dequeue().unwrap(), Some("a".to_string()));
    }

    #[test]
    fn test_storage_failure_is_returned() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);

        storage.set_disabled(true);
        let err = queue.enqueue("foo".to_string()).unwrap_err();
        storage.set_disabled(false);

        assert!(matches!(
            err,
            QueueError::StorageWrite { ref key, source: StorageError::Disabled } if key == "test-q-item-0"
        ));
        // Nothing was committed
        assert!(new_queue(&storage).is_empty());
    }

    #[test]
    fn test_quota_failure_during_commit() {
        // Enough room for the record, not for the record and an entry
        let storage = LocalStorage::with_storage("test", MemoryStorage::with_quota(70));
        let mut queue = new_queue(&storage);

        let err = queue.enqueue("z".repeat(60)).unwrap_err();

        assert!(matches!(
            err,
            QueueError::StorageWrite { source: StorageError::QuotaExceeded { .. }, .. }
        ));
        assert!(new_queue(&storage).is_empty());
    }

    #[test]
    fn test_corrupt_entry_is_reported() {
        let mut storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        queue.enqueue("bar".to_string()).unwrap();
        storage.set_item("test-q-item-0", "{not json").unwrap();

        let results: Vec<_> = queue.iter().collect();
        assert!(matches!(results[0], Err(QueueError::Deserialization { .. })));
        assert_eq!(results[1].as_ref().unwrap(), "bar");

        let err = queue.dequeue().unwrap_err();
        assert!(matches!(err, QueueError::Deserialization { .. }));
        // Rolled back, not skipped
        assert!(!queue.is_empty());
        assert_eq!(queue.iter().count(), 2);
    }

    #[test]
    fn test_missing_entry_is_skipped() {
        let mut storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        queue.enqueue("bar".to_string()).unwrap();
        storage.remove_item("test-q-item-0").unwrap();

        assert_eq!(items(&queue), vec!["bar"]);
        assert_eq!(queue.dequeue().unwrap(), Some("bar".to_string()));
        assert!(queue.is_empty());
        assert_eq!(queue.size_in_bytes(), 0);
        assert_eq!(queue.dequeue().unwrap(), None);
    }

    #[test]
    fn test_dequeue_of_only_missing_entries_empties_queue() {
        let mut storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        storage.remove_item("test-q-item-0").unwrap();

        assert_eq!(queue.dequeue().unwrap(), None);
        assert!(queue.is_empty());
        assert!(new_queue(&storage).is_empty());
    }

    #[test]
    fn test_inflated_size_is_corrected() {
        let mut storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        storage
            .set_item(KEY_PREFIX, r#"{"sizeInBytes":500,"startIndex":0,"nextFreeIndex":1}"#)
            .unwrap();

        let mut queue = new_queue(&storage);
        queue.enqueue("bar".to_string()).unwrap();

        assert_eq!(items(&queue), vec!["bar"]);
        assert_eq!(queue.size_in_bytes(), footprint(1, "bar"));

        queue.enqueue("baz".to_string()).unwrap();
        assert_eq!(items(&queue), vec!["bar", "baz"]);
    }

    #[test]
    fn test_failed_commit_does_not_wedge_queue() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("first".to_string()).unwrap();

        storage.set_disabled(true);
        assert!(queue.enqueue("lost".to_string()).unwrap_err().is_storage_failure());
        storage.set_disabled(false);
        assert_eq!(items(&queue), vec!["first"]);
        assert_eq!(queue.size_in_bytes(), footprint(0, "first"));

        // Enough to fill the queue and evict several times over
        let values: Vec<String> = (0..40).map(|i| format!("v{}", i)).collect();
        for value in &values {
            queue.enqueue(value.clone()).unwrap();
        }

        let stored = items(&queue);
        assert!(!stored.is_empty());
        assert_eq!(stored, values[values.len() - stored.len()..]);
        assert!(queue.remaining_space() >= 0);

        let restored = new_queue(&storage);
        assert_eq!(items(&restored), stored);
        assert_eq!(restored.size_in_bytes(), queue.size_in_bytes());
    }

    #[test]
    fn test_failed_dequeue_commit_keeps_entry() {
        let storage = LocalStorage::new("test");
        let mut queue = new_queue(&storage);
        queue.enqueue("foo".to_string()).unwrap();
        queue.enqueue("bar".to_string()).unwrap();

        storage.set_disabled(true);
        queue.dequeue().unwrap_err();
        storage.set_disabled(false);

        assert_eq!(items(&queue), vec!["foo", "bar"]);
        assert_eq!(queue.dequeue().unwrap(), Some("foo".to_string()));
    }

    #[test]
    fn test_huge_limit_never_evicts() {
        let storage = LocalStorage::new("test");
        let mut queue: LimitedSizeQueue<String, _> =
            LimitedSizeQueue::new(QueueConfig::new(KEY_PREFIX, u64::MAX), storage).unwrap();

        for value in ["a", "b", "c"] {
            queue.enqueue(value.to_string()).unwrap();
        }

        assert_eq!(queue.iter().collect::<QueueResult<Vec<_>>>().unwrap(), vec!["a", "b", "c"]);
    }
}
