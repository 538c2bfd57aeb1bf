//! Sort coordinator: owns the worker pool and runs either strategy.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::batch::{Batch, SortOutcome};
use super::concurrent::ConcurrentSorter;
use super::error::SortError;
use super::pool::{WorkerPool, WorkerPoolConfig, WorkerPoolStats};
use super::sequential::sort_sequential;
use crate::telemetry;

/// Execution strategy for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Sequential,
    Concurrent,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the sort coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub pool: WorkerPoolConfig,
    /// Deadline for the concurrent fan-in.
    pub sort_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            pool: WorkerPoolConfig::default(),
            sort_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs batches through the sequential or concurrent strategy.
#[derive(Debug)]
pub struct SortCoordinator {
    pool: Arc<WorkerPool>,
    concurrent: ConcurrentSorter,
}

impl SortCoordinator {
    /// Start the worker pool and build a coordinator around it.
    pub fn new(config: CoordinatorConfig) -> std::io::Result<Self> {
        let pool = Arc::new(WorkerPool::new(config.pool)?);
        let concurrent = ConcurrentSorter::new(pool.clone(), config.sort_timeout);
        Ok(Self { pool, concurrent })
    }

    /// Sequential strategy on the current thread.
    pub fn sort_sequential(&self, batch: Batch) -> SortOutcome {
        sort_sequential(batch)
    }

    /// Concurrent strategy on the worker pool.
    pub async fn sort_concurrent(&self, batch: Batch) -> Result<SortOutcome, SortError> {
        self.concurrent.sort(batch).await
    }

    /// Run `strategy` over `batch` and record the outcome.
    ///
    /// The sequential strategy runs on tokio's blocking pool so a large
    /// batch never stalls the async runtime.
    pub async fn run(&self, strategy: Strategy, batch: Batch) -> Result<SortOutcome, SortError> {
        let items = batch.len();
        let elements = batch.total_elements();

        let result = match strategy {
            Strategy::Sequential => tokio::task::spawn_blocking(move || sort_sequential(batch))
                .await
                .map_err(|e| SortError::TaskFailed(e.to_string())),
            Strategy::Concurrent => self.sort_concurrent(batch).await,
        };

        match &result {
            Ok(outcome) => {
                telemetry::record_batch_success(strategy, items, elements, outcome.elapsed_ns());
                tracing::debug!(
                    %strategy,
                    items,
                    time_ns = outcome.elapsed_ns(),
                    "batch sorted"
                );
            }
            Err(e) => {
                telemetry::record_batch_failure(strategy, e.kind());
                tracing::warn!(%strategy, items, error = %e, "batch sort failed");
            }
        }
        result
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn pool_stats(&self) -> WorkerPoolStats {
        self.pool.stats()
    }

    pub fn num_workers(&self) -> usize {
        self.pool.num_threads()
    }

    pub fn queue_capacity(&self) -> usize {
        self.pool.queue_capacity()
    }

    pub fn sort_timeout(&self) -> Duration {
        self.concurrent.timeout()
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_shutdown()
    }

    /// Stop the worker pool. Pending concurrent sorts fail with `WorkersLost`.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
