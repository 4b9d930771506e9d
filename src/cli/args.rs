// file: src/cli/args.rs
// version: 1.0.0
// guid: 3cdafb05-96a0-4b0a-9d5c-a020d535687f

//! Command line argument definitions

use crate::logging::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deploylib")]
#[command(about = "Helpers for deployment write scripts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "Configuration file to load")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print each argument shell-quoted, separated by spaces
    Quote {
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Run a command on a remote host over SSH
    Ssh {
        #[arg(help = "Target host, as understood by ssh")]
        host: String,

        #[arg(last = true, required = true, help = "Remote command and its arguments")]
        command: Vec<String>,
    },

    /// Append validated record values to a file
    Write {
        #[arg(help = "File to append to")]
        file: PathBuf,

        #[arg(long, help = "JSON or YAML object of records, or - for stdin")]
        from: Option<String>,

        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        set: Vec<(String, String)>,

        #[arg(long, help = "Require values to be ASCII digits")]
        digits: bool,

        #[arg(long, help = "Reject empty values")]
        non_empty: bool,

        #[arg(long, help = "Reject values containing line breaks")]
        single_line: bool,

        #[arg(long, help = "Require values to fully match a regular expression")]
        pattern: Option<String>,
    },
}

/// Parse a `KEY=VALUE` pair, splitting at the first `=`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}
