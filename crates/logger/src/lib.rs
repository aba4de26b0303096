//! Logging chain with a persistent, size-limited history.
//!
//! Entries flow through a chain of loggers: the local storage logger keeps
//! recent entries in a `LimitedSizeQueue`, the console logger reports them
//! through `tracing`, and the null logger ends the chain. `LogBootstrapper`
//! assembles the default chain behind the `Log` facade.

pub mod bootstrap;
pub mod config;
pub mod entry;
pub mod formatter;
pub mod level;
pub mod loggers;

pub use bootstrap::{Log, LogBootstrapper};
pub use config::LocalStorageLoggerConfig;
pub use entry::LogEntry;
pub use formatter::{DefaultFormatter, LogEntryFormatter};
pub use level::{LogLevel, ParseLogLevelError};
pub use loggers::{ConsoleLogger, LocalStorageLogger, Logger, NullLogger};
