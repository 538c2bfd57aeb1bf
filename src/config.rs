//! Runtime configuration loading from environment variables.
//!
//! Every value has a default. Invalid values fall back to the default and
//! are clamped to a floor; loading never fails.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `PARSORT_PORT` (or `PORT`) | 8080 | Listening port |
//! | `PARSORT_BIND_ADDR` | 0.0.0.0 | Listening address |
//! | `PARSORT_WORKERS` | 0 | Worker threads (0 = available parallelism) |
//! | `PARSORT_QUEUE_CAPACITY` | 1048576 | Max queued sort jobs |
//! | `PARSORT_SORT_TIMEOUT_MS` | 30000 | Concurrent fan-in deadline (ms) |
//! | `PARSORT_MAX_BODY_BYTES` | 67108864 | Request body limit (bytes) |
//! | `PARSORT_SHUTDOWN_TIMEOUT` | 30 | Graceful drain timeout (secs) |
//! | `PARSORT_LOG_FORMAT` | json | `json` or `pretty` |
//! | `RUST_LOG` | parsort=info,tower_http=info | Log filter |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::sorter::{CoordinatorConfig, WorkerPoolConfig};
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 20;
pub const DEFAULT_SORT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Flat summary of effective values, for `parsort config show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub bind_addr: String,
    pub port: u16,
    pub workers: usize,
    pub queue_capacity: usize,
    pub sort_timeout_ms: u64,
    pub max_body_bytes: usize,
    pub shutdown_timeout_secs: u64,
    pub log_format: &'static str,
    pub log_level: String,
}

/// All runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub coordinator: CoordinatorConfig,
    pub max_body_bytes: usize,
    pub shutdown_timeout: Duration,
    pub log: LogConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            coordinator: CoordinatorConfig {
                pool: WorkerPoolConfig {
                    queue_capacity: DEFAULT_QUEUE_CAPACITY,
                    ..Default::default()
                },
                sort_timeout: Duration::from_millis(DEFAULT_SORT_TIMEOUT_MS),
            },
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            log: LogConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    parse_env(key).unwrap_or(default)
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    parse_env(key).unwrap_or(default)
}

/// `PARSORT_PORT` wins over the conventional `PORT`.
fn load_port() -> u16 {
    parse_env::<u16>("PARSORT_PORT")
        .or_else(|| parse_env::<u16>("PORT"))
        .unwrap_or(DEFAULT_PORT)
}

fn load_pool_config() -> WorkerPoolConfig {
    let num_threads = parse_usize("PARSORT_WORKERS", 0).min(4096);
    let queue_capacity = parse_usize("PARSORT_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY).max(1);
    WorkerPoolConfig {
        num_threads,
        queue_capacity,
        ..Default::default()
    }
}

fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let format = std::env::var("PARSORT_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    let level = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.level);
    LogConfig { format, level }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    let bind_addr = parse_env::<IpAddr>("PARSORT_BIND_ADDR")
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let sort_timeout_ms = parse_u64("PARSORT_SORT_TIMEOUT_MS", DEFAULT_SORT_TIMEOUT_MS).max(1);
    let max_body_bytes = parse_usize("PARSORT_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES).max(1024);
    let shutdown_secs =
        parse_u64("PARSORT_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS).max(1);

    EnvConfig {
        bind_addr,
        port: load_port(),
        coordinator: CoordinatorConfig {
            pool: load_pool_config(),
            sort_timeout: Duration::from_millis(sort_timeout_ms),
        },
        max_body_bytes,
        shutdown_timeout: Duration::from_secs(shutdown_secs),
        log: load_log_config(),
    }
}

impl EnvConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            bind_addr: self.bind_addr.to_string(),
            port: self.port,
            workers: self.coordinator.pool.resolved_threads().get(),
            queue_capacity: self.coordinator.pool.queue_capacity,
            sort_timeout_ms: self.coordinator.sort_timeout.as_millis() as u64,
            max_body_bytes: self.max_body_bytes,
            shutdown_timeout_secs: self.shutdown_timeout.as_secs(),
            log_format: self.log.format.as_str(),
            log_level: self.log.level.clone(),
        }
    }
}
