//! Wrapping positional index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an entry in the queue.
///
/// Indices count up forever and wrap at `MODULUS` (2^53 - 1, the largest
/// integer a JSON number holds exactly). Positions are only ever compared for
/// equality: walking from the start index with `next()` until the next free
/// index is reached visits the live entries in order, across a wrap too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct QueueIndex(u64);

impl QueueIndex {
    pub const MODULUS: u64 = 9_007_199_254_740_991;
    pub const ZERO: QueueIndex = QueueIndex(0);

    pub fn new(value: u64) -> Self {
        Self(value % Self::MODULUS)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The index that follows this one.
    pub fn next(self) -> Self {
        Self((self.0 + 1) % Self::MODULUS)
    }
}

impl From<u64> for QueueIndex {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<QueueIndex> for u64 {
    fn from(index: QueueIndex) -> Self {
        index.0
    }
}

impl fmt::Display for QueueIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
