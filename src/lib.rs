//! parsort: batch integer sorting service.
//!
//! Accepts a batch of integer arrays over HTTP and sorts every array either
//! sequentially on one thread or concurrently on a bounded worker pool.
//!
//! # Endpoints
//!
//! - `POST /process-single`: sequential strategy
//! - `POST /process-concurrent`: concurrent strategy
//! - `GET /health`, `/live`, `/ready`: health checks
//! - `GET /metrics`: pool and batch statistics
//!
//! Both sort endpoints take `{"to_sort": [[int, ...], ...]}` and return
//! `{"sorted_arrays": [[int, ...], ...], "time_ns": int}`. Output slot `i`
//! always holds input slot `i`, sorted ascending.

pub mod cli;
pub mod config;
pub mod health;
pub mod http;
pub mod shutdown;
pub mod sorter;
pub mod state;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use shutdown::ShutdownCoordinator;
use sorter::{CoordinatorConfig, SortCoordinator};
use state::AppState;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub coordinator: CoordinatorConfig,
    pub max_body_bytes: usize,
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorConfig::default(),
            max_body_bytes: config::DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout: Duration::from_secs(config::DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }
}

impl From<&config::EnvConfig> for RuntimeConfig {
    fn from(env: &config::EnvConfig) -> Self {
        Self {
            coordinator: env.coordinator.clone(),
            max_body_bytes: env.max_body_bytes,
            shutdown_timeout: env.shutdown_timeout,
        }
    }
}

/// The parsort runtime instance.
pub struct Runtime {
    pub config: RuntimeConfig,
    pub coordinator: Arc<SortCoordinator>,
    pub shutdown: Arc<ShutdownCoordinator>,
    pub state: Arc<AppState>,
}

impl Runtime {
    /// Create a runtime and start its worker pool.
    pub fn new(config: RuntimeConfig) -> std::io::Result<Self> {
        let coordinator = Arc::new(SortCoordinator::new(config.coordinator.clone())?);
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let state = Arc::new(AppState::new(
            coordinator.clone(),
            shutdown.clone(),
            config.max_body_bytes,
        ));

        Ok(Self {
            config,
            coordinator,
            shutdown,
            state,
        })
    }

    /// Stop the worker pool without blocking the async runtime. Sorts still
    /// waiting on the pool fail with `WorkersLost`.
    pub async fn stop_workers(&self) -> Result<(), tokio::task::JoinError> {
        let coordinator = self.coordinator.clone();
        tokio::task::spawn_blocking(move || coordinator.shutdown()).await
    }

    /// HTTP router bound to this runtime's state.
    pub fn router(&self) -> axum::Router {
        http::router(self.state.clone())
    }
}
