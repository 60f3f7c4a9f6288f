//! Command-line interface for swe-eval.
//!
//! Provides commands for running the evaluation loop and inspecting
//! dataset slices.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
