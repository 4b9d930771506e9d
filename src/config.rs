// file: src/config.rs
// version: 1.0.0
// guid: 549b2f9b-4ea0-4aeb-85ab-6601b435d9d3

//! Policy constants and layered configuration

use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Owner applied to record files: the superuser
pub const SUPERUSER_UID: u32 = 0;

/// Group applied to record files: the superuser's group
pub const SUPERUSER_GID: u32 = 0;

/// Mode applied to record files: rw-r--r--
pub const RECORD_FILE_MODE: u32 = 0o644;

/// SSH client used when nothing else is configured
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Separator placed between the host and the remote command
pub const OPTION_TERMINATOR: &str = "--";

/// Punctuation that survives an unquoted shell word, beside ASCII letters and digits
pub const DEFAULT_SAFE_PUNCTUATION: &str = "-_/=.,:";

/// Characters a POSIX shell (or a common interactive one) treats specially.
/// None of these may ever be configured as safe.
pub const SHELL_METACHARACTERS: &str = "|&;<>()$`\\\"' \t\n*?[]{}#~!^";

const ENV_SSH_PROGRAM: &str = "DEPLOYLIB_SSH";
const ENV_SAFE_PUNCTUATION: &str = "DEPLOYLIB_SAFE_PUNCTUATION";

/// Library configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub ssh: SshConfig,
    pub quoting: QuotingConfig,
    pub records: RecordConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub program: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotingConfig {
    pub safe_punctuation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub owner_uid: u32,
    pub owner_gid: u32,
    pub mode: u32,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_SSH_PROGRAM),
        }
    }
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            safe_punctuation: DEFAULT_SAFE_PUNCTUATION.to_string(),
        }
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            owner_uid: SUPERUSER_UID,
            owner_gid: SUPERUSER_GID,
            mode: RECORD_FILE_MODE,
        }
    }
}

impl DeployConfig {
    /// Load configuration from the user config file, an optional explicit
    /// file, then environment overrides, in that order of precedence.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let user_config = Self::user_config_path().filter(|path| path.exists());
        let mut config = Self::load_layers(user_config.as_deref(), explicit)?;

        config.apply_env_overrides();

        debug!("Final configuration: {:?}", config);
        Ok(config)
    }

    /// Merge the user and explicit files key by key before deserializing, so
    /// settings the explicit file leaves out keep the user file's values.
    pub fn load_layers(user_config: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        if let Some(path) = user_config {
            info!("Loading user configuration from: {}", path.display());
            merge_tables(&mut merged, Self::read_table(path)?);
        }

        if let Some(path) = explicit {
            info!("Loading configuration from: {}", path.display());
            merge_tables(&mut merged, Self::read_table(path)?);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| DeployError::config(format!("Invalid configuration: {}", e)))
    }

    /// Get the user configuration file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deploylib").join("config.toml"))
    }

    /// Load configuration from a single TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load_layers(None, Some(path))
    }

    fn read_table(path: &Path) -> Result<toml::Table> {
        let content = fs::read_to_string(path).map_err(|e| {
            DeployError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        content.parse::<toml::Table>().map_err(|e| {
            DeployError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(program) = std::env::var(ENV_SSH_PROGRAM) {
            if !program.is_empty() {
                self.ssh.program = PathBuf::from(program);
            }
        }

        if let Ok(punctuation) = std::env::var(ENV_SAFE_PUNCTUATION) {
            self.quoting.safe_punctuation = punctuation;
        }
    }
}

/// Recursively overlay `overlay` onto `base`; nested tables merge, other values replace
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(nested) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, nested);
                continue;
            }
            base.insert(key, toml::Value::Table(nested));
        } else {
            base.insert(key, value);
        }
    }
}
