//! CLI subcommands that run without a server.
//!
//! ## Usage
//!
//! ```bash
//! parsort config show      # Effective configuration
//! parsort config defaults  # Built-in defaults
//! parsort config validate  # Exit 1 on suspicious values
//! ```

pub mod config_cmd;
