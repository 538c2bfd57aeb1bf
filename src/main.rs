//! parsort entry point.
//!
//! ## CLI Subcommands
//!
//! - `parsort` or `parsort serve` - Run the HTTP server (default)
//! - `parsort config show|defaults|validate` - Inspect configuration
//! - `parsort version` - Print the version

use std::process::ExitCode;

use parsort::config::{self as parsort_config, EnvConfig};
use parsort::http::run_server;
use parsort::shutdown::ShutdownResult;
use parsort::telemetry::init_logging;
use parsort::{Runtime, RuntimeConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "serve" | "" => {
            let env = parsort_config::load();
            if let Err(e) = init_logging(&env.log) {
                eprintln!("Failed to initialize logging: {}", e);
                return ExitCode::from(2u8);
            }
            match serve(env).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "server error");
                    eprintln!("Server error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("parsort {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    parsort::cli::config_cmd::run_show();
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    parsort::cli::config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = parsort::cli::config_cmd::run_validate();
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

async fn serve(env: EnvConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = env.socket_addr();
    let runtime = Runtime::new(RuntimeConfig::from(&env))?;
    let shutdown = runtime.shutdown.clone();
    let shutdown_timeout = runtime.config.shutdown_timeout;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        workers = runtime.coordinator.num_workers(),
        queue_capacity = runtime.coordinator.queue_capacity(),
        sort_timeout_ms = runtime.coordinator.sort_timeout().as_millis() as u64,
        "starting parsort"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_handle = tokio::spawn(run_server(listener, runtime.router(), shutdown.clone()));

    // Wait for Ctrl+C, then initiate graceful shutdown
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining");

    match shutdown.initiate(shutdown_timeout).await {
        ShutdownResult::Complete => tracing::info!("drain complete"),
        ShutdownResult::Timeout { remaining } => {
            tracing::warn!(remaining, "drain timed out with requests in flight");
        }
    }

    runtime.stop_workers().await?;

    server_handle.await??;
    Ok(())
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "parsort - batch integer sorting service v{}

USAGE:
    parsort [COMMAND] [OPTIONS]

COMMANDS:
    serve        Run the HTTP server (default when no command given)
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

ENDPOINTS:
    POST /process-single      Sort every array on one thread
    POST /process-concurrent  Sort arrays in parallel on the worker pool
    GET  /health              Full health report
    GET  /live                Liveness check
    GET  /ready               Readiness check
    GET  /metrics             Pool and batch statistics

ENVIRONMENT:
    PARSORT_PORT / PORT       Listening port (default: 8080)
    PARSORT_BIND_ADDR         Listening address (default: 0.0.0.0)
    PARSORT_WORKERS           Worker threads, 0 = one per CPU (default: 0)
    PARSORT_QUEUE_CAPACITY    Max queued sort jobs (default: 1048576)
    PARSORT_SORT_TIMEOUT_MS   Concurrent sort deadline (default: 30000)
    PARSORT_MAX_BODY_BYTES    Request body limit (default: 67108864)
    PARSORT_SHUTDOWN_TIMEOUT  Drain timeout in seconds (default: 30)
    PARSORT_LOG_FORMAT        json or pretty (default: json)
    RUST_LOG                  Log filter

EXIT CODES:
    0  Success
    1  Failure / invalid configuration
    2  Logging setup error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "serve" => {
            eprintln!(
                "parsort serve - Run the HTTP server

USAGE:
    parsort serve

DESCRIPTION:
    Starts the worker pool and serves HTTP on PARSORT_BIND_ADDR:PARSORT_PORT.
    Ctrl+C stops accepting connections, drains in-flight sorts for up to
    PARSORT_SHUTDOWN_TIMEOUT seconds, then stops the worker pool.

EXAMPLES:
    parsort serve
    PARSORT_PORT=9000 PARSORT_WORKERS=4 parsort serve
"
            );
        }
        "config" => {
            eprintln!(
                "parsort config - Inspect configuration

USAGE:
    parsort config <SUBCOMMAND>

SUBCOMMANDS:
    show      Print effective configuration (default)
    defaults  Print built-in defaults
    validate  Check environment values; exit 1 on warnings

EXAMPLES:
    parsort config show
    PARSORT_WORKERS=abc parsort config validate
"
            );
        }
        _ => {
            eprintln!("No detailed help for '{}'.", command);
            print_usage();
        }
    }
}
