use super::Logger;
use crate::entry::LogEntry;

/// A logger that does nothing. Terminates a chain of loggers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&mut self, _entry: &LogEntry) {}
}
