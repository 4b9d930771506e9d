// file: src/cli/mod.rs
// version: 1.0.0
// guid: c8c1acba-e117-44a0-b8ff-3d56f2c1a59d

//! Command line interface for the deploylib helper binary

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
