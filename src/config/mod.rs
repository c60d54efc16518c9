//! Board Configuration Module
//!
//! Detector timings, device selection and output backend, loaded read-only
//! from TOML.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `BOARD_CONFIG` environment variable (path to TOML file)
//! 3. `board_config.toml` in the current working directory
//! 4. Built-in defaults
//!
//! Command-line flags are applied on top of whatever was loaded. The result
//! is passed by value into the pipeline; there is no global config.

mod board_config;
pub mod defaults;
pub mod validation;

pub use board_config::*;
