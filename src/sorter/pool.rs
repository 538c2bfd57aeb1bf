//! Bounded worker pool for sort jobs.
//!
//! A fixed set of OS threads pulls jobs from one shared FIFO queue. The
//! queue has a hard capacity; batch submission is all-or-nothing so a
//! batch is never half-enqueued.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::{Condvar, Mutex, RwLock};
use thiserror::Error;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads (0 = available parallelism).
    pub num_threads: usize,
    /// Maximum number of jobs waiting in the queue.
    pub queue_capacity: usize,
    /// Thread stack size in bytes (0 = platform default).
    pub stack_size: usize,
    /// Thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            queue_capacity: 1 << 20,
            stack_size: 0,
            thread_name_prefix: "sort-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Create config with a specific thread count.
    pub fn with_threads(count: usize) -> Self {
        Self {
            num_threads: count.max(1),
            ..Default::default()
        }
    }

    /// Thread count after resolving auto-detection.
    pub fn resolved_threads(&self) -> NonZeroUsize {
        let n = if self.num_threads == 0 {
            num_cpus::get()
        } else {
            self.num_threads
        };
        NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
    }
}

/// A unit of work executed by the pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Statistics for pool activity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerPoolStats {
    pub jobs_executed: u64,
    pub jobs_panicked: u64,
    pub avg_exec_time_us: u64,
    pub queued_jobs: usize,
    pub threads_active: usize,
    pub threads_idle: usize,
}

/// Errors for pool submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Worker pool is shut down")]
    PoolShutdown,

    #[error("Job queue is full ({capacity} jobs)")]
    QueueFull { capacity: usize },
}

struct Shared {
    queue: Mutex<VecDeque<Job>>,
    available: Condvar,
    shutdown: AtomicBool,
    active: AtomicUsize,
    stats: RwLock<WorkerPoolStats>,
}

/// Fixed-size pool of sort worker threads.
pub struct WorkerPool {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    config: WorkerPoolConfig,
    num_threads: usize,
}

impl WorkerPool {
    /// Spawn the worker threads.
    pub fn new(config: WorkerPoolConfig) -> std::io::Result<Self> {
        let num_threads = config.resolved_threads().get();
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            shutdown: AtomicBool::new(false),
            active: AtomicUsize::new(0),
            stats: RwLock::new(WorkerPoolStats::default()),
        });

        let mut handles = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, id));
            if config.stack_size > 0 {
                builder = builder.stack_size(config.stack_size);
            }
            let shared_clone = shared.clone();
            let handle = match builder.spawn(move || Self::worker_loop(&shared_clone)) {
                Ok(h) => h,
                Err(e) => {
                    Self::stop_threads(&shared, handles);
                    return Err(e);
                }
            };
            handles.push(handle);
        }

        tracing::debug!(threads = num_threads, "worker pool started");

        Ok(Self {
            shared,
            handles: Mutex::new(handles),
            config,
            num_threads,
        })
    }

    /// Submit a single job.
    pub fn submit(&self, job: Job) -> Result<(), PoolError> {
        self.submit_all(vec![job])
    }

    /// Submit a set of jobs atomically: either all are queued or none are.
    pub fn submit_all(&self, jobs: Vec<Job>) -> Result<(), PoolError> {
        if jobs.is_empty() {
            return Ok(());
        }
        {
            let mut queue = self.shared.queue.lock();
            if self.shared.shutdown.load(Ordering::SeqCst) {
                return Err(PoolError::PoolShutdown);
            }
            if queue.len() + jobs.len() > self.config.queue_capacity {
                return Err(PoolError::QueueFull {
                    capacity: self.config.queue_capacity,
                });
            }
            queue.extend(jobs);
        }
        self.shared.available.notify_all();
        Ok(())
    }

    fn worker_loop(shared: &Shared) {
        loop {
            let job = {
                let mut queue = shared.queue.lock();
                loop {
                    if shared.shutdown.load(Ordering::SeqCst) {
                        return;
                    }
                    if let Some(job) = queue.pop_front() {
                        break job;
                    }
                    shared.available.wait(&mut queue);
                }
            };

            shared.active.fetch_add(1, Ordering::SeqCst);
            let start = Instant::now();
            let panicked = panic::catch_unwind(AssertUnwindSafe(job)).is_err();
            let exec_us = start.elapsed().as_micros() as u64;
            shared.active.fetch_sub(1, Ordering::SeqCst);

            let mut s = shared.stats.write();
            s.jobs_executed += 1;
            if panicked {
                s.jobs_panicked += 1;
                tracing::warn!("sort job panicked; worker continues");
            }
            // Rolling average of execution time
            s.avg_exec_time_us = if s.avg_exec_time_us == 0 {
                exec_us
            } else {
                (s.avg_exec_time_us * 9 + exec_us) / 10
            };
        }
    }

    /// Current statistics.
    pub fn stats(&self) -> WorkerPoolStats {
        let mut stats = self.shared.stats.read().clone();
        stats.queued_jobs = self.queued_jobs();
        stats.threads_active = self.shared.active.load(Ordering::SeqCst);
        stats.threads_idle = self.num_threads.saturating_sub(stats.threads_active);
        stats
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn queued_jobs(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs, drop queued ones, and join all threads.
    ///
    /// Dropped jobs release whatever they captured, so coordinators waiting
    /// on them observe closed result channels instead of hanging.
    pub fn shutdown(&self) {
        let handles = std::mem::take(&mut *self.handles.lock());
        Self::stop_threads(&self.shared, handles);
    }

    fn stop_threads(shared: &Shared, handles: Vec<JoinHandle<()>>) {
        let dropped = {
            let mut queue = shared.queue.lock();
            shared.shutdown.store(true, Ordering::SeqCst);
            std::mem::take(&mut *queue)
        };
        shared.available.notify_all();
        if !dropped.is_empty() {
            tracing::warn!(jobs = dropped.len(), "dropping queued sort jobs on shutdown");
        }
        drop(dropped);

        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads)
            .field("queue_capacity", &self.config.queue_capacity)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_pool_runs_jobs() {
        let pool = WorkerPool::new(WorkerPoolConfig::with_threads(2)).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        let jobs: Vec<Job> = (0..10)
            .map(|_| {
                let counter = counter.clone();
                let tx = tx.clone();
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tx.send(()).unwrap();
                }) as Job
            })
            .collect();
        pool.submit_all(jobs).unwrap();

        for _ in 0..10 {
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_auto_detect_threads() {
        let pool = WorkerPool::new(WorkerPoolConfig::default()).unwrap();
        assert!(pool.num_threads() >= 1);
    }

    #[test]
    fn test_submit_all_is_all_or_nothing() {
        let config = WorkerPoolConfig {
            num_threads: 1,
            queue_capacity: 3,
            ..Default::default()
        };
        let pool = WorkerPool::new(config).unwrap();

        // Park the only worker so the queue does not drain.
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        pool.submit(Box::new(move || {
            started_tx.send(()).unwrap();
            let _ = release_rx.recv();
        }))
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let jobs: Vec<Job> = (0..4).map(|_| Box::new(|| {}) as Job).collect();
        assert_eq!(
            pool.submit_all(jobs),
            Err(PoolError::QueueFull { capacity: 3 })
        );
        assert_eq!(pool.queued_jobs(), 0);

        release_tx.send(()).unwrap();
    }

    #[test]
    fn test_panicking_job_does_not_kill_worker() {
        let pool = WorkerPool::new(WorkerPoolConfig::with_threads(1)).unwrap();
        pool.submit(Box::new(|| panic!("boom"))).unwrap();

        let (tx, rx) = mpsc::channel();
        pool.submit(Box::new(move || tx.send(42).unwrap())).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);

        let stats = pool.stats();
        assert_eq!(stats.jobs_panicked, 1);
        assert!(stats.jobs_executed >= 1);
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new(WorkerPoolConfig::with_threads(1)).unwrap();
        pool.shutdown();
        assert!(pool.is_shutdown());
        assert_eq!(pool.submit(Box::new(|| {})), Err(PoolError::PoolShutdown));
    }

    #[test]
    fn test_shutdown_drops_queued_jobs() {
        let pool = WorkerPool::new(WorkerPoolConfig::with_threads(1)).unwrap();

        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        pool.submit(Box::new(move || {
            started_tx.send(()).unwrap();
            let _ = release_rx.recv();
        }))
        .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let (tx, rx) = mpsc::channel::<()>();
        pool.submit(Box::new(move || tx.send(()).unwrap())).unwrap();

        release_tx.send(()).unwrap();
        pool.shutdown();

        // Either the job ran before shutdown or its sender was dropped.
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => panic!("queued job leaked"),
        }
    }
}
