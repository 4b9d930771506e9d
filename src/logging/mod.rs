// file: src/logging/mod.rs
// version: 1.0.0
// guid: 84648e64-8968-4073-93c4-0225c4eeac2b

//! Logging setup for the deploylib helper binary

pub mod logger;

pub use logger::{init_logger, LogFormat};
