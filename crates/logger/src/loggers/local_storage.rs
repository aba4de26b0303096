use queue::{LimitedSizeQueue, QueueResult};
use storage::Storage;

use super::Logger;
use crate::config::LocalStorageLoggerConfig;
use crate::entry::LogEntry;

/// Logger that keeps entries in a size-limited queue in local storage.
/// The oldest entries are overwritten once the configured size is reached.
pub struct LocalStorageLogger<S, N> {
    queue: LimitedSizeQueue<LogEntry, S>,
    next: N,
}

impl<S: Storage, N: Logger> LocalStorageLogger<S, N> {
    /// Create the logger, restoring any entries already stored under the log name.
    pub fn new(config: &LocalStorageLoggerConfig, storage: S, next: N) -> QueueResult<Self> {
        Ok(Self {
            queue: LimitedSizeQueue::new(config.queue_config(), storage)?,
            next,
        })
    }

    /// Every stored entry, oldest first.
    pub fn all_entries(&self) -> QueueResult<Vec<LogEntry>> {
        self.queue.iter().collect()
    }

    pub fn queue(&self) -> &LimitedSizeQueue<LogEntry, S> {
        &self.queue
    }
}

impl<S: Storage, N: Logger> Logger for LocalStorageLogger<S, N> {
    /// A failure to store the entry is reported and otherwise ignored; the
    /// entry always reaches the rest of the chain.
    fn log(&mut self, entry: &LogEntry) {
        if let Err(error) = self.queue.enqueue(entry.clone()) {
            tracing::warn!(
                log = %self.queue.config().key_prefix,
                %error,
                "Failed to log to local storage"
            );
        }
        self.next.log(entry);
    }
}
