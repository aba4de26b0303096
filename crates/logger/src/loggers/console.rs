use super::Logger;
use crate::entry::LogEntry;
use crate::formatter::LogEntryFormatter;
use crate::level::LogLevel;

/// Logger that reports entries on the console through `tracing`.
pub struct ConsoleLogger<F, N> {
    formatter: F,
    next: N,
}

impl<F: LogEntryFormatter, N: Logger> ConsoleLogger<F, N> {
    pub fn new(formatter: F, next: N) -> Self {
        Self { formatter, next }
    }
}

impl<F: LogEntryFormatter, N: Logger> Logger for ConsoleLogger<F, N> {
    fn log(&mut self, entry: &LogEntry) {
        let message = self.formatter.format(entry);
        match entry.level {
            LogLevel::Trace => tracing::trace!(target: "lsl::console", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "lsl::console", "{}", message),
            LogLevel::Info => tracing::info!(target: "lsl::console", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "lsl::console", "{}", message),
            LogLevel::Error | LogLevel::Fatal => {
                tracing::error!(target: "lsl::console", "{}", message)
            }
        }
        self.next.log(entry);
    }
}
