//! probectl - command-line client for the probectl monitoring API
//!
//! This crate holds the binary's process-lifecycle core:
//!
//! - **Error classification**: every failure becomes exactly one stable
//!   [`ExitCode`] and one `Error:` message block ([`ErrorReporter`]).
//! - **Graceful shutdown**: SIGINT/SIGTERM cancel in-flight work, run
//!   registered cleanups once in reverse order, and override the exit code
//!   with 130/143 ([`ShutdownHandle`]).
//! - **Telemetry**: one best-effort event per invocation, sent in the
//!   background and drained with a bounded wait ([`TelemetryClient`]).
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | general error |
//! | 2 | misuse |
//! | 3 | authentication required |
//! | 4 | forbidden |
//! | 5 | not found |
//! | 6 | rate limited |
//! | 7 | server error |
//! | 8 | network |
//! | 9 | timeout |
//! | 10 | plan limit |
//! | 130 | interrupted (SIGINT) |
//! | 143 | terminated (SIGTERM) |

pub mod api_client;
pub mod cli;

pub use probectl_config::{EnvOverrides, PreferenceFile, PreferenceStore, Preferences, ValueSource};
pub use probectl_error_reporter::{
    ApiError, Cancelled, ClassifiedError, ErrorReporter, Fault, MessageCatalog, UsageError,
    classify,
};
pub use probectl_shutdown::{ShutdownError, ShutdownHandle, ShutdownSignal};
pub use probectl_telemetry::{TelemetryClient, TelemetryEvent, hash_org_id, sanitize_command};
pub use probectl_utils::{ExitCode, levenshtein, suggest};
