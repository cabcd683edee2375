//! Literal text patterns for errors that never reached the typed API shape.
//!
//! Both tables match against the lowercased error text. They are allow-lists:
//! a message only counts when it contains one of the listed fragments.

use once_cell::sync::Lazy;
use probectl_utils::ExitCode;
use regex::Regex;

/// Status fragments recognised in untyped error text.
const HTTP_STATUS_PATTERNS: &[(&str, ExitCode)] = &[
    ("401 unauthorized", ExitCode::AUTH_REQUIRED),
    ("status: 401", ExitCode::AUTH_REQUIRED),
    ("status code 401", ExitCode::AUTH_REQUIRED),
    ("returned 401", ExitCode::AUTH_REQUIRED),
    ("403 forbidden", ExitCode::FORBIDDEN),
    ("status: 403", ExitCode::FORBIDDEN),
    ("status code 403", ExitCode::FORBIDDEN),
    ("returned 403", ExitCode::FORBIDDEN),
    ("404 not found", ExitCode::NOT_FOUND),
    ("status: 404", ExitCode::NOT_FOUND),
    ("status code 404", ExitCode::NOT_FOUND),
    ("returned 404", ExitCode::NOT_FOUND),
    ("500 internal server", ExitCode::SERVER_ERROR),
    ("502 bad gateway", ExitCode::SERVER_ERROR),
    ("503 service unavailable", ExitCode::SERVER_ERROR),
    ("504 gateway timeout", ExitCode::SERVER_ERROR),
    ("status: 500", ExitCode::SERVER_ERROR),
    ("status: 502", ExitCode::SERVER_ERROR),
    ("status: 503", ExitCode::SERVER_ERROR),
    ("returned 500", ExitCode::SERVER_ERROR),
    ("returned 502", ExitCode::SERVER_ERROR),
    ("returned 503", ExitCode::SERVER_ERROR),
];

/// Connection-level fragments.
///
/// "dial tcp" and similar are deliberately absent: HTTP-layer errors mention
/// the dial step in passing and would be misreported as network faults.
const NETWORK_PATTERNS: &[&str] = &[
    "connection refused",
    "no such host",
    "network is unreachable",
    "no route to host",
    "host is unreachable",
    "connection reset by peer",
    "broken pipe",
    "i/o timeout",
    "dns error",
    "failed to lookup address",
];

/// Anything shaped like an HTTP status report, whether or not the status is in
/// [`HTTP_STATUS_PATTERNS`].
static HTTP_ERROR_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:status(?:\s+code)?|returned|http/\d(?:\.\d)?)\s*:?\s*[1-5]\d{2}\b|\b[45]\d{2}\s+(?:bad request|unauthorized|payment required|forbidden|not found|conflict|too many requests|internal server|bad gateway|service unavailable|gateway timeout)\b",
    )
    .unwrap()
});

/// Map an HTTP status embedded in error text to an exit code.
#[must_use]
pub fn http_status_exit_code(message: &str) -> Option<ExitCode> {
    let lower = message.to_lowercase();
    HTTP_STATUS_PATTERNS
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, code)| *code)
}

/// Broader check: does this text look like an HTTP error report at all?
///
/// Text that passes is never treated as a network fault, even when it also
/// contains a network fragment.
#[must_use]
pub fn looks_like_http_error(message: &str) -> bool {
    http_status_exit_code(message).is_some() || HTTP_ERROR_SHAPE.is_match(message)
}

/// Does this text describe a connection-level failure?
#[must_use]
pub fn is_network_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    NETWORK_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}
