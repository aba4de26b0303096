//! Chain-of-responsibility loggers.
//!
//! Each logger handles an entry and hands it on to the next one in its chain.

mod console;
mod local_storage;
mod null;

pub use console::ConsoleLogger;
pub use local_storage::LocalStorageLogger;
pub use null::NullLogger;

use crate::entry::LogEntry;

/// Logs individual log entries.
pub trait Logger {
    fn log(&mut self, entry: &LogEntry);
}

impl<L: Logger + ?Sized> Logger for &mut L {
    fn log(&mut self, entry: &LogEntry) {
        (**self).log(entry)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&mut self, entry: &LogEntry) {
        (**self).log(entry)
    }
}
