//! Typed error returned by the probectl API.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Structured API error.
///
/// The JSON body of a non-2xx response deserializes into this type; the HTTP
/// status and `Retry-After` header are filled in by the caller since they are
/// not part of the body.
///
/// ```json
/// {"code": "validation_error", "message": "invalid probe", "request_id": "req_1",
///  "fields": {"interval": "must be at least 30s"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "requestId")]
    pub request_id: Option<String>,
    #[serde(default, alias = "errors")]
    pub fields: BTreeMap<String, String>,
    #[serde(skip)]
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields.insert(field.into(), message.into());
        self
    }

    #[must_use]
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.code == "unauthorized" || self.code == "invalid_api_key"
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.status == 403 || self.code == "forbidden"
    }

    /// Plan limits are usually reported with HTTP 403 as well; callers must
    /// test this before [`is_forbidden`](Self::is_forbidden).
    #[must_use]
    pub fn is_plan_limit_exceeded(&self) -> bool {
        matches!(self.code.as_str(), "plan_limit_exceeded" | "plan_limit_reached")
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code == "not_found"
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.code == "rate_limited"
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self.status, 400 | 422)
            || matches!(self.code.as_str(), "validation_error" | "invalid_request")
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status) || self.code == "internal_error"
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}", self.status)?;
        if !self.code.is_empty() {
            write!(f, " ({})", self.code)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
