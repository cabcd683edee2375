//! Fire-and-forget usage telemetry.
//!
//! One [`TelemetryEvent`] is recorded per invocation. [`TelemetryClient::track`]
//! never waits on the network; [`TelemetryClient::flush`] is the only call that
//! does, and it gives up after its timeout. Send failures are logged at debug
//! level and otherwise discarded.
//!
//! Events carry the client version, the sanitized command path, the exit code,
//! the duration, the platform and an optional truncated hash of the
//! organization id. Nothing else.

mod client;
mod event;
mod sink;

pub use client::{DEFAULT_FLUSH_TIMEOUT, MAX_IN_FLIGHT, TelemetryClient};
pub use event::{ORG_HASH_LEN, TelemetryEvent, hash_org_id, sanitize_command};
pub use sink::{DEFAULT_ENDPOINT, EventSink, HttpSink, NoopSink, SEND_TIMEOUT, TelemetryError, user_agent};
