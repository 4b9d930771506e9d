// file: src/util/quote.rs
// version: 1.0.0
// guid: b45c52b3-593d-4894-bbc5-458c407a4f72

//! Shell argument quoting
//!
//! Every character outside the safe set is quoted on its own, so the output
//! never leaves a quoting context open and concatenating quoted words is
//! always well formed. A single quote becomes `"'"`; any other unsafe
//! character `c` becomes `'c'`.

use crate::config::{DEFAULT_SAFE_PUNCTUATION, SHELL_METACHARACTERS};
use crate::error::{DeployError, Result};
use tracing::debug;

/// Characters that may appear unquoted in a shell word.
///
/// ASCII letters and digits are always safe. The punctuation list is policy
/// and may only contain printable ASCII outside [`SHELL_METACHARACTERS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeCharset {
    punctuation: Vec<char>,
}

impl SafeCharset {
    pub fn new(punctuation: &str) -> Result<Self> {
        let mut chars: Vec<char> = Vec::with_capacity(punctuation.len());
        for c in punctuation.chars() {
            if !c.is_ascii_graphic() || SHELL_METACHARACTERS.contains(c) {
                return Err(DeployError::config(format!(
                    "character {:?} cannot be treated as shell-safe",
                    c
                )));
            }
            if !c.is_ascii_alphanumeric() && !chars.contains(&c) {
                chars.push(c);
            }
        }
        Ok(Self { punctuation: chars })
    }

    pub fn is_safe(&self, c: char) -> bool {
        c.is_ascii_alphanumeric() || self.punctuation.contains(&c)
    }

    pub fn punctuation(&self) -> String {
        self.punctuation.iter().collect()
    }
}

impl Default for SafeCharset {
    fn default() -> Self {
        Self {
            punctuation: DEFAULT_SAFE_PUNCTUATION.chars().collect(),
        }
    }
}

/// Quotes arguments against a [`SafeCharset`]
#[derive(Debug, Clone, Default)]
pub struct ShellQuoter {
    charset: SafeCharset,
}

impl ShellQuoter {
    pub fn new(charset: SafeCharset) -> Self {
        Self { charset }
    }

    pub fn charset(&self) -> &SafeCharset {
        &self.charset
    }

    /// Quote `argument` so a POSIX shell reads it back as one literal word
    pub fn quote(&self, argument: &str) -> String {
        let mut quoted = String::with_capacity(argument.len());
        for c in argument.chars() {
            if self.charset.is_safe(c) {
                quoted.push(c);
            } else if c == '\'' {
                quoted.push_str("\"'\"");
            } else {
                quoted.push('\'');
                quoted.push(c);
                quoted.push('\'');
            }
        }
        if quoted.len() != argument.len() {
            debug!("Quoted argument {:?} as {}", argument, quoted);
        }
        quoted
    }
}

/// Return a shell-quoted version of `argument` using the default safe set
pub fn shell_quote(argument: &str) -> String {
    ShellQuoter::default().quote(argument)
}
