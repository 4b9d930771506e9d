// file: src/main.rs
// version: 1.0.0
// guid: 28b5a390-45cf-49b0-ac13-f8fd516a438c

//! deploylib - Main entry point

use clap::Parser;
use deploylib::{
    cli::{
        args::{Cli, Commands},
        commands::*,
    },
    config::DeployConfig,
    logging::logger,
    DeployError,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger(cli.verbose, cli.quiet, cli.log_format) {
        eprintln!("{}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DeployConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Quote { args } => quote_command(&config, &args)?,
        Commands::Ssh { host, command } => ssh_command(&config, &host, &command)?,
        Commands::Write {
            file,
            from,
            set,
            digits,
            non_empty,
            single_line,
            pattern,
        } => {
            let flags = ValidationFlags {
                digits,
                non_empty,
                single_line,
                pattern,
            };
            write_command(&config, &file, from.as_deref(), &set, &flags)?
        }
    }

    Ok(())
}

/// Mirror a failed remote command's exit status, otherwise exit 1
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<DeployError>()
        .and_then(DeployError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}
