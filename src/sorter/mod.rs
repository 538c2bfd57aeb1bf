//! Batch sorting core.
//!
//! Holds the two strategies (sequential and pooled concurrent), the bounded
//! worker pool they share, and the coordinator that picks between them.

mod batch;
mod concurrent;
mod coordinator;
mod error;
mod pool;
mod sequential;

pub use batch::{Batch, SortOutcome, WorkItem};
pub use concurrent::ConcurrentSorter;
pub use coordinator::{CoordinatorConfig, SortCoordinator, Strategy};
pub use error::SortError;
pub use pool::{Job, PoolError, WorkerPool, WorkerPoolConfig, WorkerPoolStats};
pub use sequential::sort_sequential;
