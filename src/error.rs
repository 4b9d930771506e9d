// file: src/error.rs
// version: 1.0.0
// guid: 417be6b3-dfce-4c5e-b52e-9ba76ffedbd4

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, DeployError>;

/// Error types surfaced to write scripts
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Command execution error: `{command}` failed ({}): {}", describe_exit(*exit_code), stderr.trim())]
    CommandExecution {
        command: String,
        exit_code: Option<i32>,
        stdout: Vec<u8>,
        stderr: String,
    },

    #[error("Validation error: {key}={value:?}: {reason}")]
    Validation {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Permission denied: {}: {source}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Script(String),
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

impl DeployError {
    /// Create a new validation error
    pub fn validation(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new script error
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    /// Classify a filesystem error against `path`.
    ///
    /// EPERM and EACCES both surface as [`DeployError::Permission`].
    pub fn from_fs(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::Permission {
                path: path.to_path_buf(),
                source,
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }

    /// Exit status of a failed remote command, if one was reported
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandExecution { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
