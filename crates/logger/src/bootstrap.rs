//! Assembles the default logging chain.

use chrono::{DateTime, Utc};
use queue::QueueResult;
use serde::Serialize;
use std::sync::Arc;
use storage::Storage;

use crate::config::LocalStorageLoggerConfig;
use crate::entry::LogEntry;
use crate::formatter::{DefaultFormatter, LogEntryFormatter};
use crate::level::LogLevel;
use crate::loggers::{ConsoleLogger, LocalStorageLogger, Logger, NullLogger};

type TimestampProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The default chain: local storage, then console, then nothing.
pub type LogChain<S> = LocalStorageLogger<S, ConsoleLogger<DefaultFormatter, NullLogger>>;

/// Builds `Log` instances wired with the default loggers and formatter.
#[derive(Clone)]
pub struct LogBootstrapper {
    timestamp_provider: TimestampProvider,
}

impl LogBootstrapper {
    /// Create a bootstrapper that stamps entries with the current time.
    pub fn new() -> Self {
        Self::with_timestamp_provider(Utc::now)
    }

    /// Create a bootstrapper that takes entry times from `provider`.
    pub fn with_timestamp_provider(
        provider: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        Self {
            timestamp_provider: Arc::new(provider),
        }
    }

    /// Set up a log named by `config`, kept in `storage`.
    pub fn bootstrap<S: Storage>(
        &self,
        config: &LocalStorageLoggerConfig,
        storage: S,
    ) -> QueueResult<Log<S>> {
        let formatter = DefaultFormatter;
        let console = ConsoleLogger::new(formatter, NullLogger);
        let chain = LocalStorageLogger::new(config, storage, console)?;

        tracing::debug!(log = %config.log_name, "Log chain ready");

        Ok(Log {
            chain,
            formatter,
            timestamp_provider: self.timestamp_provider.clone(),
        })
    }
}

impl Default for LogBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging interface handed to consumers.
///
/// Each call takes its arguments as any serializable value. A tuple, slice
/// or vector is written as its elements joined by commas, so
/// `log.info(("cache hit", 34))` records the message `"cache hit",34`.
pub struct Log<S> {
    chain: LogChain<S>,
    formatter: DefaultFormatter,
    timestamp_provider: TimestampProvider,
}

impl<S: Storage> Log<S> {
    pub fn trace(&mut self, args: impl Serialize) {
        self.write(LogLevel::Trace, args);
    }

    pub fn debug(&mut self, args: impl Serialize) {
        self.write(LogLevel::Debug, args);
    }

    pub fn info(&mut self, args: impl Serialize) {
        self.write(LogLevel::Info, args);
    }

    pub fn warn(&mut self, args: impl Serialize) {
        self.write(LogLevel::Warn, args);
    }

    pub fn error(&mut self, args: impl Serialize) {
        self.write(LogLevel::Error, args);
    }

    pub fn fatal(&mut self, args: impl Serialize) {
        self.write(LogLevel::Fatal, args);
    }

    /// Write a message of the given level to the start of the chain.
    pub fn write(&mut self, level: LogLevel, args: impl Serialize) {
        let message = match format_message(&args) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, "Failed to serialize log message");
                return;
            }
        };

        let time = (self.timestamp_provider)();
        self.chain.log(&LogEntry::new(time, level, message));
    }

    /// Every stored entry, oldest first, formatted for display.
    pub fn export_to_array(&self) -> QueueResult<Vec<String>> {
        Ok(self
            .chain
            .all_entries()?
            .iter()
            .map(|entry| self.formatter.format(entry))
            .collect())
    }

    /// Every stored entry, oldest first.
    pub fn entries(&self) -> QueueResult<Vec<LogEntry>> {
        self.chain.all_entries()
    }
}

/// JSON text of `args`, without the brackets when it is an array.
fn format_message(args: &impl Serialize) -> serde_json::Result<String> {
    let json = serde_json::to_string(args)?;
    if json.starts_with('[') && json.ends_with(']') {
        return Ok(json[1..json.len() - 1].to_string());
    }
    Ok(json)
}
