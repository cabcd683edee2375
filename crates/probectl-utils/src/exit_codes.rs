//! Exit code constants for probectl.
//!
//! This module defines the standardized exit codes for every failure mode the
//! CLI can report. External scripts branch on these values, so the numbers are
//! part of the public contract.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `GENERAL_ERROR` | Unclassified failure (or silent cancellation) |
//! | 2 | `MISUSE` | Invalid arguments or rejected input |
//! | 3 | `AUTH_REQUIRED` | Missing or invalid credentials |
//! | 4 | `FORBIDDEN` | Authenticated but not permitted |
//! | 5 | `NOT_FOUND` | Resource does not exist |
//! | 6 | `RATE_LIMITED` | Too many requests |
//! | 7 | `SERVER_ERROR` | API returned a 5xx |
//! | 8 | `NETWORK` | Connection-level failure |
//! | 9 | `TIMEOUT` | Request or deadline timed out |
//! | 10 | `PLAN_LIMIT` | Account plan limit reached |
//! | 130 | `INTERRUPTED` | Interrupted by SIGINT |
//! | 143 | `TERMINATED` | Terminated by SIGTERM |
//!
//! Codes 130 and 143 are reserved for the shutdown coordinator; error
//! classification never produces them.

use std::fmt;

/// Exit codes matching the documented exit code table.
///
/// Use the named constants, or [`as_i32()`](Self::as_i32) to get the numeric
/// value for `std::process::exit()`.
///
/// # Example
///
/// ```rust
/// use probectl_utils::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::PLAN_LIMIT.as_i32(), 10);
/// assert_eq!(ExitCode::NOT_FOUND, ExitCode::from_i32(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// General error - anything that does not fit a more specific category
    pub const GENERAL_ERROR: ExitCode = ExitCode(1);

    /// Misuse - invalid arguments, validation failures
    pub const MISUSE: ExitCode = ExitCode(2);

    /// Authentication required - no credentials or rejected credentials
    pub const AUTH_REQUIRED: ExitCode = ExitCode(3);

    /// Forbidden - credentials lack permission for the operation
    pub const FORBIDDEN: ExitCode = ExitCode(4);

    /// Not found - the requested resource does not exist
    pub const NOT_FOUND: ExitCode = ExitCode(5);

    /// Rate limited - the API asked the client to slow down
    pub const RATE_LIMITED: ExitCode = ExitCode(6);

    /// Server error - the API failed while handling the request
    pub const SERVER_ERROR: ExitCode = ExitCode(7);

    /// Network - the API could not be reached
    pub const NETWORK: ExitCode = ExitCode(8);

    /// Timeout - the request or an enclosing deadline expired
    pub const TIMEOUT: ExitCode = ExitCode(9);

    /// Plan limit - the account's plan does not allow the operation
    pub const PLAN_LIMIT: ExitCode = ExitCode(10);

    /// Interrupted - SIGINT received (128 + 2)
    pub const INTERRUPTED: ExitCode = ExitCode(130);

    /// Terminated - SIGTERM received (128 + 15)
    pub const TERMINATED: ExitCode = ExitCode(143);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Whether this code is one of the signal-derived codes.
    #[must_use]
    pub const fn is_signal(self) -> bool {
        self.0 == Self::INTERRUPTED.0 || self.0 == Self::TERMINATED.0
    }

    /// Stable snake_case name for diagnostics and documentation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "success",
            1 => "general_error",
            2 => "misuse",
            3 => "auth_required",
            4 => "forbidden",
            5 => "not_found",
            6 => "rate_limited",
            7 => "server_error",
            8 => "network",
            9 => "timeout",
            10 => "plan_limit",
            130 => "interrupted",
            143 => "terminated",
            _ => "unknown",
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.name())
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_constants() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::GENERAL_ERROR.as_i32(), 1);
        assert_eq!(ExitCode::MISUSE.as_i32(), 2);
        assert_eq!(ExitCode::AUTH_REQUIRED.as_i32(), 3);
        assert_eq!(ExitCode::FORBIDDEN.as_i32(), 4);
        assert_eq!(ExitCode::NOT_FOUND.as_i32(), 5);
        assert_eq!(ExitCode::RATE_LIMITED.as_i32(), 6);
        assert_eq!(ExitCode::SERVER_ERROR.as_i32(), 7);
        assert_eq!(ExitCode::NETWORK.as_i32(), 8);
        assert_eq!(ExitCode::TIMEOUT.as_i32(), 9);
        assert_eq!(ExitCode::PLAN_LIMIT.as_i32(), 10);
        assert_eq!(ExitCode::INTERRUPTED.as_i32(), 130);
        assert_eq!(ExitCode::TERMINATED.as_i32(), 143);
    }

    #[test]
    fn test_signal_codes_are_flagged() {
        assert!(ExitCode::INTERRUPTED.is_signal());
        assert!(ExitCode::TERMINATED.is_signal());
        assert!(!ExitCode::GENERAL_ERROR.is_signal());
        assert!(!ExitCode::from_i32(131).is_signal());
    }

    #[test]
    fn test_display_includes_name() {
        assert_eq!(ExitCode::RATE_LIMITED.to_string(), "6 (rate_limited)");
        assert_eq!(ExitCode::from_i32(42).to_string(), "42 (unknown)");
    }

    #[test]
    fn test_i32_conversions() {
        let code: ExitCode = 9.into();
        assert_eq!(code, ExitCode::TIMEOUT);
        let raw: i32 = ExitCode::NETWORK.into();
        assert_eq!(raw, 8);
    }
}
