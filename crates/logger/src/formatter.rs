//! Log entry formatting.

use crate::entry::LogEntry;

/// Formats log entries for presentation.
pub trait LogEntryFormatter {
    fn format(&self, entry: &LogEntry) -> String;
}

/// Formats an entry as `[TIME] [LEVEL] MESSAGE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatter;

impl LogEntryFormatter for DefaultFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        format!("[{}] [{}] {}", entry.time, entry.level, entry.message)
    }
}
