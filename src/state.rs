//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::health::{HealthChecker, HealthConfig, HealthInputs, HealthReport};
use crate::shutdown::ShutdownCoordinator;
use crate::sorter::SortCoordinator;

pub struct AppState {
    pub coordinator: Arc<SortCoordinator>,
    pub shutdown: Arc<ShutdownCoordinator>,
    pub health: HealthChecker,
    /// Request bodies larger than this are rejected with 413.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        coordinator: Arc<SortCoordinator>,
        shutdown: Arc<ShutdownCoordinator>,
        max_body_bytes: usize,
    ) -> Self {
        // Readiness drops once the pool queue is full.
        let health = HealthChecker::new(HealthConfig {
            max_queued_jobs: coordinator.queue_capacity(),
        });
        Self {
            coordinator,
            shutdown,
            health,
            max_body_bytes,
        }
    }

    pub fn health_report(&self) -> HealthReport {
        let pool = self.coordinator.pool_stats();
        self.health.report(&self.health_inputs(&pool))
    }

    pub fn is_ready(&self) -> bool {
        let pool = self.coordinator.pool_stats();
        self.health.is_ready(&self.health_inputs(&pool))
    }

    fn health_inputs<'a>(&self, pool: &'a crate::sorter::WorkerPoolStats) -> HealthInputs<'a> {
        HealthInputs {
            shutdown_state: self.shutdown.state(),
            in_flight: self.shutdown.in_flight_count(),
            workers: self.coordinator.num_workers(),
            pool,
            pool_shutdown: self.coordinator.is_shut_down(),
        }
    }
}
