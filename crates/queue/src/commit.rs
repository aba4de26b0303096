//! Staged queue mutations.

use storage::Storage;

use crate::error::{QueueError, QueueResult};
use crate::node::Entry;

/// Entry writes and removals staged since the last commit.
///
/// A commit is applied whole by `apply`, which consumes it: removals first,
/// then additions, then the bookkeeping record. The storage area has no
/// transactions, so a failure part way leaves the earlier steps in place.
/// With that order a failure can orphan freshly written entries but never
/// leaves the bookkeeping record pointing at entries that were removed.
#[derive(Clone, Debug, Default)]
pub struct PendingCommit {
    removed: Vec<Entry>,
    added: Vec<Entry>,
}

impl PendingCommit {
    pub fn added(&self) -> &[Entry] {
        &self.added
    }

    pub fn removed(&self) -> &[Entry] {
        &self.removed
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub(crate) fn stage_add(&mut self, entry: Entry) {
        self.added.push(entry);
    }

    pub(crate) fn stage_remove(&mut self, entry: Entry) {
        self.removed.push(entry);
    }

    /// Apply every staged change and write `record` under `record_key`.
    pub(crate) fn apply<S: Storage + ?Sized>(
        self,
        storage: &mut S,
        record_key: &str,
        record: &str,
    ) -> QueueResult<()> {
        for entry in &self.removed {
            entry.remove(storage)?;
        }
        for entry in &self.added {
            entry.store(storage)?;
        }
        storage
            .set_item(record_key, record)
            .map_err(|e| QueueError::write(record_key, e))
    }
}
