// file: src/lib.rs
// version: 1.0.0
// guid: a37acb50-08a3-44b6-9080-04053bb1a8e7

//! # deploylib
//!
//! Common code used by the deployment "write" scripts: shell quoting for
//! commands sent over SSH, a synchronous SSH command runner, and an
//! append-only record writer that validates every entry before touching the
//! target file and fixes its ownership and mode afterwards.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod writeexts;

pub use error::{DeployError, Result};
pub use util::quote::shell_quote;
pub use util::ssh::run_ssh_command;
pub use writeexts::records::write_from_dict;

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
