//! Concurrent strategy: fan items out to the worker pool, fan results back in.
//!
//! Items are grouped into a handful of jobs per worker. Each job owns its
//! items together with the slot index each came from; it reports
//! `(slot, item)` back over an mpsc channel per item and the coordinator
//! writes into that slot. Delivery order on the channel carries no meaning.
//!
//! Pool admission counts jobs, not items, so an idle pool accepts a batch of
//! any size.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::batch::{Batch, SortOutcome, WorkItem};
use super::error::SortError;
use super::pool::{Job, WorkerPool};

/// Per-item sort routine run inside a job.
type ItemSorter = fn(&mut WorkItem);

/// Items bound to their slot indices, handled by one job.
type Chunk = Vec<(usize, WorkItem)>;

/// Upper bound on jobs per worker thread for one batch.
const JOBS_PER_WORKER: usize = 4;

fn sort_item(item: &mut WorkItem) {
    item.sort_unstable();
}

/// What a job sends back to the coordinator.
struct SlotReport {
    slot: usize,
    result: Option<WorkItem>,
}

/// Dispatches batches onto a shared [`WorkerPool`].
#[derive(Clone)]
pub struct ConcurrentSorter {
    pool: Arc<WorkerPool>,
    timeout: Duration,
    sorter: ItemSorter,
}

impl ConcurrentSorter {
    pub fn new(pool: Arc<WorkerPool>, timeout: Duration) -> Self {
        Self {
            pool,
            timeout,
            sorter: sort_item,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_sorter(mut self, sorter: ItemSorter) -> Self {
        self.sorter = sorter;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sort every item of `batch` on the pool and reassemble in slot order.
    ///
    /// Returns once every job has reported or the deadline passes. On any
    /// failure the batch is not returned; the error says why.
    pub async fn sort(&self, mut batch: Batch) -> Result<SortOutcome, SortError> {
        let start = Instant::now();
        let total = batch.len();
        if total == 0 {
            return Ok(SortOutcome {
                batch,
                elapsed: start.elapsed(),
            });
        }

        let cancel = CancellationToken::new();
        // Cancels outstanding jobs if this future is dropped mid-wait.
        let _cancel_on_drop = cancel.clone().drop_guard();

        let (tx, mut rx) = mpsc::unbounded_channel::<SlotReport>();
        let job_count = self.job_count(total);
        let chunk_len = total.div_ceil(job_count);
        let mut items = batch.take_items().into_iter().enumerate().peekable();
        let mut jobs: Vec<Job> = Vec::with_capacity(job_count);
        while items.peek().is_some() {
            let chunk: Chunk = items.by_ref().take(chunk_len).collect();
            jobs.push(self.job(chunk, tx.clone(), cancel.clone()));
        }
        drop(tx);

        let dispatched = jobs.len();
        self.pool.submit_all(jobs)?;
        tracing::debug!(items = total, jobs = dispatched, "dispatched sort jobs");

        let deadline = tokio::time::Instant::from_std(start + self.timeout);
        let mut slots: Vec<Option<WorkItem>> = (0..total).map(|_| None).collect();
        let mut reported = 0usize;
        let mut first_panic: Option<usize> = None;

        while reported < total {
            let report = match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(report)) => report,
                Ok(None) => {
                    return Err(SortError::WorkersLost {
                        pending: total - reported,
                    });
                }
                Err(_) => {
                    cancel.cancel();
                    let err = SortError::Timeout {
                        pending: total - reported,
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    };
                    tracing::warn!(error = %err, "sort fan-in deadline exceeded");
                    return Err(err);
                }
            };
            reported += 1;

            let slot = report.slot;
            match report.result {
                Some(item) => match slots.get_mut(slot) {
                    Some(entry) if entry.is_none() => *entry = Some(item),
                    _ => return Err(SortError::SlotConflict { slot }),
                },
                None => {
                    if slot >= total {
                        return Err(SortError::SlotConflict { slot });
                    }
                    first_panic = Some(first_panic.map_or(slot, |s| s.min(slot)));
                }
            }
        }
        let elapsed = start.elapsed();

        if let Some(slot) = first_panic {
            return Err(SortError::WorkerPanicked { slot });
        }

        let items: Option<Vec<WorkItem>> = slots.into_iter().collect();
        let Some(items) = items else {
            return Err(SortError::WorkersLost { pending: 0 });
        };
        batch.restore_items(items);

        Ok(SortOutcome { batch, elapsed })
    }

    /// Jobs for a batch of `total` items: enough to keep every worker busy,
    /// never more than the queue can hold.
    fn job_count(&self, total: usize) -> usize {
        total
            .min(self.pool.num_threads().saturating_mul(JOBS_PER_WORKER))
            .min(self.pool.queue_capacity())
            .max(1)
    }

    fn job(
        &self,
        chunk: Chunk,
        tx: mpsc::UnboundedSender<SlotReport>,
        cancel: CancellationToken,
    ) -> Job {
        let sorter = self.sorter;
        Box::new(move || {
            for (slot, mut item) in chunk {
                if cancel.is_cancelled() {
                    return;
                }
                let result = panic::catch_unwind(AssertUnwindSafe(move || {
                    sorter(&mut item);
                    item
                }))
                .ok();
                // Receiver gone means the batch already failed.
                if tx.send(SlotReport { slot, result }).is_err() {
                    return;
                }
            }
        })
    }
}

impl std::fmt::Debug for ConcurrentSorter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentSorter")
            .field("pool", &self.pool)
            .field("timeout", &self.timeout)
            .finish()
    }
}
