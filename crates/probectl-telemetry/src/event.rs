use std::time::Duration;

use probectl_utils::ExitCode;
use serde::{Deserialize, Serialize};

/// Hex characters kept from the organization id digest.
pub const ORG_HASH_LEN: usize = 16;

const UNKNOWN_COMMAND: &str = "unknown";

/// One invocation's usage record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub version: String,
    pub command: String,
    pub exit_code: i32,
    pub duration_ms: u64,
    pub os: String,
    pub arch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_hash: Option<String>,
}

impl TelemetryEvent {
    /// Build an event for the current platform.
    ///
    /// `command_text` is sanitized; `org_id` is hashed when non-empty.
    #[must_use]
    pub fn new(
        version: &str,
        command_text: &str,
        exit_code: ExitCode,
        duration: Duration,
        org_id: Option<&str>,
    ) -> Self {
        Self {
            version: version.to_string(),
            command: sanitize_command(command_text),
            exit_code: exit_code.as_i32(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            org_hash: org_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(hash_org_id),
        }
    }
}

/// Reduce command text to its leading subcommand path.
///
/// Stops at the first token starting with `-` or `/`, so flags, their values
/// and paths never leave the machine.
///
/// ```
/// use probectl_telemetry::sanitize_command;
///
/// assert_eq!(sanitize_command("probe create --name test"), "probe create");
/// assert_eq!(sanitize_command("--help"), "unknown");
/// ```
#[must_use]
pub fn sanitize_command(command_text: &str) -> String {
    let tokens: Vec<&str> = command_text
        .split_whitespace()
        .take_while(|token| !token.starts_with('-') && !token.starts_with('/'))
        .collect();

    if tokens.is_empty() {
        UNKNOWN_COMMAND.to_string()
    } else {
        tokens.join(" ")
    }
}

/// One-way digest of an organization id, truncated to [`ORG_HASH_LEN`] hex
/// characters.
#[must_use]
pub fn hash_org_id(org_id: &str) -> String {
    let digest = blake3::hash(org_id.as_bytes());
    digest.to_hex()[..ORG_HASH_LEN].to_string()
}
