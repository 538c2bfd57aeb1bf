//! Health check support.
//!
//! Liveness, readiness, and a full report for orchestrators.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::shutdown::ShutdownState;
use crate::sorter::WorkerPoolStats;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Detailed health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub state: HealthState,
    pub ready: bool,
    pub accepting_requests: bool,
    pub in_flight_requests: u32,
    pub workers: usize,
    pub workers_active: usize,
    pub queued_jobs: usize,
    pub jobs_panicked: u64,
    pub uptime_secs: u64,
    pub version: String,
}

/// Health check configuration.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Queued jobs at or above this count mark the service not ready.
    /// The runtime sets it to the pool's queue capacity.
    pub max_queued_jobs: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_queued_jobs: 1 << 20,
        }
    }
}

/// Point-in-time inputs to a health decision.
#[derive(Debug, Clone, Copy)]
pub struct HealthInputs<'a> {
    pub shutdown_state: ShutdownState,
    pub in_flight: u32,
    pub workers: usize,
    pub pool: &'a WorkerPoolStats,
    pub pool_shutdown: bool,
}

pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
        }
    }

    /// Liveness: the process answers.
    pub fn is_alive(&self) -> bool {
        true
    }

    /// Readiness: accepting traffic and the pool has room.
    pub fn is_ready(&self, inputs: &HealthInputs<'_>) -> bool {
        inputs.shutdown_state == ShutdownState::Running
            && !inputs.pool_shutdown
            && inputs.pool.queued_jobs < self.config.max_queued_jobs
    }

    pub fn report(&self, inputs: &HealthInputs<'_>) -> HealthReport {
        HealthReport {
            state: self.compute_state(inputs),
            ready: self.is_ready(inputs),
            accepting_requests: inputs.shutdown_state == ShutdownState::Running,
            in_flight_requests: inputs.in_flight,
            workers: inputs.workers,
            workers_active: inputs.pool.threads_active,
            queued_jobs: inputs.pool.queued_jobs,
            jobs_panicked: inputs.pool.jobs_panicked,
            uptime_secs: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn compute_state(&self, inputs: &HealthInputs<'_>) -> HealthState {
        if inputs.shutdown_state != ShutdownState::Running || inputs.pool_shutdown {
            return HealthState::Unhealthy;
        }
        if inputs.pool.queued_jobs >= self.config.max_queued_jobs {
            return HealthState::Degraded;
        }
        HealthState::Healthy
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}
