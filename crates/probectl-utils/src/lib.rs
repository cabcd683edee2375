//! Foundation utilities shared by every probectl crate.
//!
//! - [`exit_codes`]: the stable process exit code table
//! - [`suggest`]: edit-distance "did you mean" suggestions
//! - [`logging`]: tracing subscriber initialisation

pub mod exit_codes;
pub mod logging;
pub mod suggest;

pub use exit_codes::ExitCode;
pub use suggest::{levenshtein, suggest};
