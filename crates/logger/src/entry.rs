//! Log entries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::level::LogLevel;

/// An entry in an application log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was created, RFC 3339 in UTC with millisecond precision.
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(time: DateTime<Utc>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
        }
    }
}
