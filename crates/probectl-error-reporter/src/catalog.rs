//! Hint and message lookup tables.
//!
//! Built once by the process entry point and shared read-only afterwards.
//! Tests build their own catalog with [`MessageCatalog::default`] or override
//! individual entries.

use std::collections::HashMap;

/// Hint topic keys.
pub mod topics {
    pub const AUTH_REQUIRED: &str = "auth_required";
    pub const FORBIDDEN: &str = "forbidden";
    pub const PLAN_LIMIT: &str = "plan_limit";
    pub const NOT_FOUND: &str = "not_found";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const VALIDATION: &str = "validation";
    pub const SERVER_ERROR: &str = "server_error";
    pub const NETWORK: &str = "network";
    pub const NETWORK_DNS: &str = "network_dns";
    pub const NETWORK_REFUSED: &str = "network_refused";
    pub const NETWORK_RESET: &str = "network_reset";
    pub const TIMEOUT: &str = "timeout";
    pub const DEADLINE: &str = "deadline";
    pub const MISUSE: &str = "misuse";
}

const DEFAULT_HINTS: &[(&str, &str)] = &[
    (
        topics::AUTH_REQUIRED,
        "Run 'probectl login' to authenticate, or set PROBECTL_API_KEY.",
    ),
    (
        topics::FORBIDDEN,
        "Check that your API key has access to this organization.",
    ),
    (
        topics::PLAN_LIMIT,
        "Upgrade your plan from the billing page to raise this limit.",
    ),
    (
        topics::NOT_FOUND,
        "Check the ID and that the right organization is selected.",
    ),
    (topics::RATE_LIMITED, "Wait a moment and try again."),
    (
        topics::VALIDATION,
        "Check the command arguments with --help.",
    ),
    (
        topics::SERVER_ERROR,
        "This is a problem on the server side. Try again shortly and quote the request ID if you contact support.",
    ),
    (
        topics::NETWORK,
        "Check your internet connection and proxy settings.",
    ),
    (
        topics::NETWORK_DNS,
        "Check the API URL and your DNS settings.",
    ),
    (
        topics::NETWORK_REFUSED,
        "Nothing is accepting connections at the API URL. Check PROBECTL_API_URL.",
    ),
    (
        topics::NETWORK_RESET,
        "The connection was dropped mid-request. Check your network and try again.",
    ),
    (
        topics::TIMEOUT,
        "The API did not answer in time. Check your connection or try again.",
    ),
    (
        topics::DEADLINE,
        "The operation ran past its deadline. Try again or raise --timeout.",
    ),
    (topics::MISUSE, "Run with --help to see valid usage."),
];

const DEFAULT_API_MESSAGES: &[(&str, &str)] = &[
    ("unauthorized", "Authentication required"),
    ("invalid_api_key", "Invalid API key"),
    ("forbidden", "You do not have permission to perform this action"),
    ("plan_limit_exceeded", "Your plan limit has been reached"),
    ("plan_limit_reached", "Your plan limit has been reached"),
    ("not_found", "Resource not found"),
    ("rate_limited", "Too many requests"),
    ("validation_error", "The request was invalid"),
    ("invalid_request", "The request was invalid"),
    ("internal_error", "The server encountered an internal error"),
    ("service_unavailable", "The service is temporarily unavailable"),
];

/// Topic hints and API code summaries.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    hints: HashMap<String, String>,
    api_messages: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let to_map = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect()
        };
        Self {
            hints: to_map(DEFAULT_HINTS),
            api_messages: to_map(DEFAULT_API_MESSAGES),
        }
    }
}

impl MessageCatalog {
    /// Hint for a topic key.
    #[must_use]
    pub fn hint(&self, topic: &str) -> Option<&str> {
        self.hints.get(topic).map(String::as_str)
    }

    /// User-friendly summary for an API error code.
    #[must_use]
    pub fn api_message(&self, code: &str) -> Option<&str> {
        self.api_messages.get(code).map(String::as_str)
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_hint(mut self, topic: impl Into<String>, hint: impl Into<String>) -> Self {
        self.hints.insert(topic.into(), hint.into());
        self
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_api_message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.api_messages.insert(code.into(), message.into());
        self
    }
}
