// file: src/logging/logger.rs
// version: 1.0.0
// guid: 42093892-0097-4c54-990b-9eb8be84998d

//! Logger initialization and configuration
//!
//! Log output always goes to stderr so stdout stays reserved for command
//! output that write scripts capture.

use crate::error::{DeployError, Result};
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Default filter directive for the given verbosity flags
pub fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the verbosity flags when it is set.
pub fn init_logger(verbose: bool, quiet: bool, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(io::stderr).json())
            .try_init(),
    };

    result.map_err(|e| DeployError::config(format!("Failed to initialize logger: {}", e)))
}
