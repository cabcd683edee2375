//! Command-line interface for probectl
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point and the per-invocation dispatch loop
//! - `commands`: command implementations
//! - `output`: output format selection and rendering

pub mod args;
mod commands;
pub mod output;
mod run;

pub use args::{Cli, Commands, TelemetryCommands, build_cli};
pub use output::{OUTPUT_FORMATS, OutputFormat};
pub use run::{dispatch, run};
