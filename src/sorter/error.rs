//! Sort coordinator error types.
//!
//! Sorting integers cannot fail. Every variant here describes a failure of
//! the dispatch or fan-in machinery around it.

use thiserror::Error;

use super::pool::PoolError;

/// Errors reported by the concurrent strategy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("Sort timed out after {elapsed_ms}ms with {pending} items pending")]
    Timeout { pending: usize, elapsed_ms: u64 },

    #[error("Worker panicked while sorting slot {slot}")]
    WorkerPanicked { slot: usize },

    #[error("Workers stopped reporting with {pending} items pending")]
    WorkersLost { pending: usize },

    #[error("Slot {slot} reported twice or out of range")]
    SlotConflict { slot: usize },

    #[error("Worker pool is shut down")]
    PoolShutdown,

    #[error("Worker queue is full ({capacity} jobs)")]
    QueueFull { capacity: usize },

    #[error("Sort task failed: {0}")]
    TaskFailed(String),
}

impl SortError {
    /// Returns true if the failure is caused by load rather than a fault.
    pub fn is_overload(&self) -> bool {
        matches!(self, Self::QueueFull { .. } | Self::Timeout { .. })
    }

    /// Short label used in metrics and span fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::WorkerPanicked { .. } => "worker_panicked",
            Self::WorkersLost { .. } => "workers_lost",
            Self::SlotConflict { .. } => "slot_conflict",
            Self::PoolShutdown => "pool_shutdown",
            Self::QueueFull { .. } => "queue_full",
            Self::TaskFailed(_) => "task_failed",
        }
    }
}

impl From<PoolError> for SortError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::PoolShutdown => Self::PoolShutdown,
            PoolError::QueueFull { capacity } => Self::QueueFull { capacity },
        }
    }
}
