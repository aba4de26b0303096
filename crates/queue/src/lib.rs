//! Size-limited FIFO queue persisted in a key-value storage area.
//!
//! Every entry lives under its own key (`{prefix}-item-{index}`) and a single
//! bookkeeping record (`{prefix}`) tracks where the queue starts, where the
//! next entry goes and how many bytes the entries are estimated to occupy.
//! Enqueuing past the configured size evicts the oldest entries.
//!
//! The queue never logs. It is the storage layer of a logging chain, so
//! every failure is returned to the caller instead.

pub mod bookkeeper;
pub mod commit;
pub mod config;
pub mod error;
pub mod index;
pub mod node;
pub mod queue;

pub use bookkeeper::{Bookkeeper, BookkeepingInfo, IndexValues};
pub use commit::PendingCommit;
pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use index::QueueIndex;
pub use node::{Entry, Node};
pub use queue::{Iter, LimitedSizeQueue};
