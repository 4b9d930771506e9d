// file: src/util/ssh.rs
// version: 1.0.0
// guid: e815b278-545c-49fb-94a2-22770face861

//! SSH command execution for write scripts
//!
//! The local ssh client receives each quoted argument as its own argv entry.
//! ssh joins everything after the host into one command string for the
//! remote shell, which is where the quoting takes effect.

use crate::config::{DeployConfig, DEFAULT_SSH_PROGRAM, OPTION_TERMINATOR};
use crate::error::{DeployError, Result};
use crate::util::quote::{SafeCharset, ShellQuoter};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error};

/// An SSH invocation: `<program> <host> -- <quoted args>...`
#[derive(Debug, Clone)]
pub struct SshCommand {
    host: String,
    args: Vec<String>,
}

impl SshCommand {
    pub fn new<I, S>(host: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            host: host.into(),
            args: command.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Arguments handed to the ssh client after the program name
    pub fn client_args(&self, quoter: &ShellQuoter) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        argv.push(self.host.clone());
        argv.push(OPTION_TERMINATOR.to_string());
        argv.extend(self.args.iter().map(|arg| quoter.quote(arg)));
        argv
    }

    /// Full argv using the default client and quoting policy
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![DEFAULT_SSH_PROGRAM.to_string()];
        argv.extend(self.client_args(&ShellQuoter::default()));
        argv
    }
}

/// Runs [`SshCommand`]s synchronously through an ssh client binary
#[derive(Debug, Clone)]
pub struct SshRunner {
    program: PathBuf,
    quoter: ShellQuoter,
}

impl SshRunner {
    /// Create a runner using the system `ssh`
    pub fn new() -> Self {
        Self::with_program(DEFAULT_SSH_PROGRAM)
    }

    /// Create a runner using an alternate client binary
    pub fn with_program(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            quoter: ShellQuoter::default(),
        }
    }

    pub fn from_config(config: &DeployConfig) -> Result<Self> {
        let charset = SafeCharset::new(&config.quoting.safe_punctuation)?;
        Ok(Self::with_program(&config.ssh.program).with_quoter(ShellQuoter::new(charset)))
    }

    pub fn with_quoter(mut self, quoter: ShellQuoter) -> Self {
        self.quoter = quoter;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `command` on `host` and return its captured standard output
    pub fn run<I, S>(&self, host: &str, command: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.execute(&SshCommand::new(host, command))
    }

    pub fn execute(&self, command: &SshCommand) -> Result<Vec<u8>> {
        let args = command.client_args(&self.quoter);
        let invocation = self.render(&args);
        debug!("Executing SSH command: {}", invocation);

        let program = which::which(&self.program).map_err(|e| DeployError::CommandExecution {
            command: invocation.clone(),
            exit_code: None,
            stdout: Vec::new(),
            stderr: format!("Failed to locate {}: {}", self.program.display(), e),
        })?;

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DeployError::CommandExecution {
                command: invocation.clone(),
                exit_code: None,
                stdout: Vec::new(),
                stderr: format!("Failed to execute command: {}", e),
            })?;

        if !output.status.success() {
            let exit_code = output.status.code();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();

            error!("Command failed with exit code {:?}", exit_code);
            if !stderr.trim().is_empty() {
                error!("STDERR: {}", stderr.trim());
            }

            return Err(DeployError::CommandExecution {
                command: invocation,
                exit_code,
                stdout: output.stdout,
                stderr,
            });
        }

        debug!("Command executed successfully: {} bytes", output.stdout.len());
        Ok(output.stdout)
    }

    fn render(&self, args: &[String]) -> String {
        let mut rendered = self.program.display().to_string();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

impl Default for SshRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `command` over SSH on `host`, returning its standard output
pub fn run_ssh_command<I, S>(host: &str, command: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SshRunner::new().run(host, command)
}
