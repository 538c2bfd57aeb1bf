//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables
//! without starting the server.

use std::net::IpAddr;

use crate::config::{self, EffectiveConfig, EnvConfig};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() {
    let cfg = config::load().effective_config();
    print_config(&cfg);
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = collect_warnings();
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }

    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

fn collect_warnings() -> Vec<String> {
    let mut warnings = Vec::new();

    // Loading falls back to defaults silently; surface values that were ignored.
    for key in ["PARSORT_PORT", "PORT"] {
        check_parses::<u16>(key, &mut warnings);
    }
    check_parses::<IpAddr>("PARSORT_BIND_ADDR", &mut warnings);
    for key in [
        "PARSORT_WORKERS",
        "PARSORT_QUEUE_CAPACITY",
        "PARSORT_MAX_BODY_BYTES",
    ] {
        check_parses::<usize>(key, &mut warnings);
    }
    for key in ["PARSORT_SORT_TIMEOUT_MS", "PARSORT_SHUTDOWN_TIMEOUT"] {
        check_parses::<u64>(key, &mut warnings);
    }
    if let Ok(v) = std::env::var("PARSORT_LOG_FORMAT") {
        if v.parse::<crate::telemetry::LogFormat>().is_err() {
            warnings.push(format!("PARSORT_LOG_FORMAT={:?} is not json or pretty", v));
        }
    }

    let cfg = config::load().effective_config();
    if cfg.sort_timeout_ms > cfg.shutdown_timeout_secs.saturating_mul(1000) {
        warnings.push(format!(
            "PARSORT_SORT_TIMEOUT_MS ({}) exceeds PARSORT_SHUTDOWN_TIMEOUT ({}s); \
             drains may cut off running sorts",
            cfg.sort_timeout_ms, cfg.shutdown_timeout_secs
        ));
    }

    let cpus = num_cpus::get();
    if cfg.workers > cpus.saturating_mul(4) {
        warnings.push(format!(
            "PARSORT_WORKERS ({}) is more than 4x the available CPUs ({})",
            cfg.workers, cpus
        ));
    }

    warnings
}

fn check_parses<T: std::str::FromStr>(key: &str, warnings: &mut Vec<String>) {
    if let Ok(v) = std::env::var(key) {
        if v.trim().parse::<T>().is_err() {
            warnings.push(format!("{}={:?} is invalid; using default", key, v));
        }
    }
}

fn print_config(cfg: &EffectiveConfig) {
    println!("PARSORT_BIND_ADDR={}", cfg.bind_addr);
    println!("PARSORT_PORT={}", cfg.port);
    println!("PARSORT_WORKERS={}", cfg.workers);
    println!("PARSORT_QUEUE_CAPACITY={}", cfg.queue_capacity);
    println!("PARSORT_SORT_TIMEOUT_MS={}", cfg.sort_timeout_ms);
    println!("PARSORT_MAX_BODY_BYTES={}", cfg.max_body_bytes);
    println!("PARSORT_SHUTDOWN_TIMEOUT={}", cfg.shutdown_timeout_secs);
    println!("PARSORT_LOG_FORMAT={}", cfg.log_format);
    println!("RUST_LOG={}", cfg.log_level);
}
