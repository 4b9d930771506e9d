// file: tests/common/mod.rs
// version: 1.0.0
// guid: 76c3fbd2-e847-43bf-8fb0-b5009ab50282

//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn is_root() -> bool {
    // SAFETY: geteuid cannot fail and touches no memory.
    unsafe { libc::geteuid() == 0 }
}

/// Write an executable `/bin/sh` script standing in for the ssh client
pub fn fake_ssh(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Prints every argv entry it receives on its own line
pub const ECHO_ARGS: &str = r#"for arg in "$@"; do printf '%s\n' "$arg"; done"#;

/// Behaves like ssh to localhost: drops host and `--`, hands the rest to a shell
pub const LOCAL_SHELL: &str = r#"shift 2; exec /bin/sh -c "$*""#;
