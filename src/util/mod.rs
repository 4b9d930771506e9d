// file: src/util/mod.rs
// version: 1.0.0
// guid: cb1689bb-15e6-4cfd-b29b-81586d6f3f4d

//! Shell quoting and remote command helpers

pub mod quote;
pub mod ssh;

pub use quote::{shell_quote, SafeCharset, ShellQuoter};
pub use ssh::{run_ssh_command, SshCommand, SshRunner};
