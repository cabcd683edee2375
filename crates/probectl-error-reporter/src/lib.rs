//! Error classification and reporting for probectl.
//!
//! Every command failure funnels through [`ErrorReporter::report`], which maps
//! it to exactly one [`ExitCode`](probectl_utils::ExitCode) and writes a
//! single formatted message block to the error stream:
//!
//! ```text
//! Error: Authentication required
//!   Run 'probectl login' to authenticate, or set PROBECTL_API_KEY.
//! ```
//!
//! Errors enter as [`Fault`] values. The adaptation layer in [`fault`] turns
//! API client errors, `reqwest` errors, I/O errors and `anyhow` chains into
//! that closed set, so classification dispatches on a tag instead of probing
//! concrete types at runtime.

pub mod api;
pub mod catalog;
pub mod classify;
pub mod fault;
pub mod patterns;
pub mod reporter;

pub use api::ApiError;
pub use catalog::MessageCatalog;
pub use classify::{Branch, ClassifiedError, MAX_UNWRAP_DEPTH, classify};
pub use fault::{Cancelled, ContextFault, Fault, NetworkFault, TransportFault, UsageError};
pub use reporter::ErrorReporter;
