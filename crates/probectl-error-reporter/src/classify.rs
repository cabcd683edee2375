//! Fault → exit code classification.
//!
//! Stages run in a fixed order and the first match wins:
//!
//! 1. typed API errors (and usage errors)
//! 2. HTTP status embedded in error text
//! 3. transport timeouts, unwrapping causes until one classifies
//! 4. specific network faults (DNS, refused, reset)
//! 5. network text patterns, unless the text looks like an HTTP error
//! 6. context deadline / cancellation
//! 7. fallback to the raw text
//!
//! Typed errors come first because the text heuristics are ambiguous: the
//! digits "401" inside a network message must not outrank a structured
//! classification.

use probectl_utils::{ExitCode, suggest};

use crate::api::ApiError;
use crate::catalog::{MessageCatalog, topics};
use crate::fault::{ContextFault, Fault, NetworkFault, UsageError};
use crate::patterns;

/// Cap on how many wrapper layers are peeled off a transport fault.
pub const MAX_UNWRAP_DEPTH: usize = 8;

/// Which classification rule produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    ApiUnauthorized,
    ApiPlanLimit,
    ApiForbidden,
    ApiNotFound,
    ApiRateLimited,
    ApiValidation,
    ApiServerError,
    ApiOther,
    Usage,
    HttpStatusText,
    TransportTimeout,
    Dns,
    ConnectionRefused,
    ConnectionReset,
    NetworkText,
    DeadlineExceeded,
    Cancelled,
    Fallback,
}

impl Branch {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiUnauthorized => "api.unauthorized",
            Self::ApiPlanLimit => "api.plan_limit",
            Self::ApiForbidden => "api.forbidden",
            Self::ApiNotFound => "api.not_found",
            Self::ApiRateLimited => "api.rate_limited",
            Self::ApiValidation => "api.validation",
            Self::ApiServerError => "api.server_error",
            Self::ApiOther => "api.other",
            Self::Usage => "usage",
            Self::HttpStatusText => "http_status_text",
            Self::TransportTimeout => "transport.timeout",
            Self::Dns => "network.dns",
            Self::ConnectionRefused => "network.refused",
            Self::ConnectionReset => "network.reset",
            Self::NetworkText => "network.text",
            Self::DeadlineExceeded => "context.deadline",
            Self::Cancelled => "context.canceled",
            Self::Fallback => "fallback",
        }
    }
}

/// Outcome of classifying one top-level error.
///
/// Built once, rendered once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub exit_code: ExitCode,
    /// `None` means nothing is printed.
    pub message: Option<String>,
    pub hints: Vec<String>,
    pub request_id: Option<String>,
    pub field_errors: Vec<(String, String)>,
    pub branch: Branch,
}

impl ClassifiedError {
    fn new(exit_code: ExitCode, branch: Branch, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: Some(message.into()),
            hints: Vec::new(),
            request_id: None,
            field_errors: Vec::new(),
            branch,
        }
    }

    fn silent(exit_code: ExitCode, branch: Branch) -> Self {
        Self {
            message: None,
            ..Self::new(exit_code, branch, "")
        }
    }

    fn hint(mut self, catalog: &MessageCatalog, topic: &str) -> Self {
        if let Some(hint) = catalog.hint(topic) {
            self.hints.push(hint.to_string());
        }
        self
    }

    fn hint_text(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    fn request_id(mut self, request_id: Option<&String>) -> Self {
        self.request_id = request_id.filter(|id| !id.is_empty()).cloned();
        self
    }

    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.message.is_none()
    }
}

enum Step<'a> {
    Done(ClassifiedError),
    Unwrap(&'a Fault),
}

/// Classify a fault.
///
/// Pure: the caller decides whether and where to render the result.
#[must_use]
pub fn classify(fault: &Fault, catalog: &MessageCatalog) -> ClassifiedError {
    let mut current = fault;
    for depth in 0..MAX_UNWRAP_DEPTH {
        match classify_layer(current, fault, catalog) {
            Step::Done(classified) => return classified,
            Step::Unwrap(inner) => {
                tracing::trace!(depth, kind = inner.kind_name(), "unwrapping transport fault");
                current = inner;
            }
        }
    }
    classify_terminal(current, fault, catalog)
}

fn classify_layer<'a>(fault: &'a Fault, root: &Fault, catalog: &MessageCatalog) -> Step<'a> {
    match fault {
        Fault::Api(api) => return Step::Done(classify_api(api, catalog)),
        Fault::Usage(usage) => return Step::Done(classify_usage(usage, catalog)),
        _ => {}
    }

    let text = fault.to_string();
    if let Some(code) = patterns::http_status_exit_code(&text) {
        return Step::Done(classify_http_text(code, &text, catalog));
    }

    if let Fault::Transport(transport) = fault {
        if transport.timed_out {
            return Step::Done(
                ClassifiedError::new(ExitCode::TIMEOUT, Branch::TransportTimeout, "Request timed out")
                    .hint(catalog, topics::TIMEOUT),
            );
        }
        if let Some(cause) = &transport.cause {
            return Step::Unwrap(cause.as_ref());
        }
    }

    Step::Done(classify_terminal(fault, root, catalog))
}

/// Stages 4 through 7; never unwraps.
fn classify_terminal(fault: &Fault, root: &Fault, catalog: &MessageCatalog) -> ClassifiedError {
    match fault {
        Fault::Network(NetworkFault::Dns { host, .. }) => {
            return ClassifiedError::new(
                ExitCode::NETWORK,
                Branch::Dns,
                format!("Could not resolve host \"{host}\""),
            )
            .hint(catalog, topics::NETWORK_DNS);
        }
        Fault::Network(NetworkFault::ConnectionRefused { .. }) => {
            return ClassifiedError::new(
                ExitCode::NETWORK,
                Branch::ConnectionRefused,
                "Connection refused",
            )
            .hint(catalog, topics::NETWORK_REFUSED);
        }
        Fault::Network(NetworkFault::ConnectionReset { .. }) => {
            return ClassifiedError::new(
                ExitCode::NETWORK,
                Branch::ConnectionReset,
                "Connection reset",
            )
            .hint(catalog, topics::NETWORK_RESET);
        }
        _ => {}
    }

    let text = fault.to_string();
    if !patterns::looks_like_http_error(&text) && patterns::is_network_message(&text) {
        return ClassifiedError::new(
            ExitCode::NETWORK,
            Branch::NetworkText,
            format!("Network error: {root}"),
        )
        .hint(catalog, topics::NETWORK);
    }

    match fault {
        Fault::Context(ContextFault::DeadlineExceeded) => ClassifiedError::new(
            ExitCode::TIMEOUT,
            Branch::DeadlineExceeded,
            "Operation timed out",
        )
        .hint(catalog, topics::DEADLINE),
        // A cancelled operation is almost always the user pressing Ctrl+C;
        // a banner would only add noise.
        Fault::Context(ContextFault::Cancelled) => {
            ClassifiedError::silent(ExitCode::GENERAL_ERROR, Branch::Cancelled)
        }
        _ => ClassifiedError::new(ExitCode::GENERAL_ERROR, Branch::Fallback, root.to_string()),
    }
}

fn classify_api(api: &ApiError, catalog: &MessageCatalog) -> ClassifiedError {
    let summary = |default: &str| api_summary(api, catalog, default);

    if api.is_unauthorized() {
        return ClassifiedError::new(
            ExitCode::AUTH_REQUIRED,
            Branch::ApiUnauthorized,
            summary("Authentication required"),
        )
        .hint(catalog, topics::AUTH_REQUIRED);
    }

    // Plan limits usually arrive as 403 too; they must win over forbidden.
    if api.is_plan_limit_exceeded() {
        return ClassifiedError::new(
            ExitCode::PLAN_LIMIT,
            Branch::ApiPlanLimit,
            summary("Plan limit reached"),
        )
        .hint(catalog, topics::PLAN_LIMIT);
    }

    if api.is_forbidden() {
        return ClassifiedError::new(
            ExitCode::FORBIDDEN,
            Branch::ApiForbidden,
            summary("Permission denied"),
        )
        .hint(catalog, topics::FORBIDDEN);
    }

    if api.is_not_found() {
        return ClassifiedError::new(
            ExitCode::NOT_FOUND,
            Branch::ApiNotFound,
            summary("Resource not found"),
        )
        .hint(catalog, topics::NOT_FOUND);
    }

    if api.is_rate_limited() {
        let classified = ClassifiedError::new(
            ExitCode::RATE_LIMITED,
            Branch::ApiRateLimited,
            summary("Too many requests"),
        );
        return match api.retry_after_secs {
            Some(secs) => classified.hint_text(format!("Retry after {secs} seconds.")),
            None => classified.hint(catalog, topics::RATE_LIMITED),
        };
    }

    if api.is_validation() {
        let mut classified = ClassifiedError::new(
            ExitCode::MISUSE,
            Branch::ApiValidation,
            summary("The request was invalid"),
        );
        if api.fields.is_empty() {
            return classified.hint(catalog, topics::VALIDATION);
        }
        classified.field_errors = api
            .fields
            .iter()
            .map(|(field, message)| (field.clone(), message.clone()))
            .collect();
        return classified;
    }

    if api.is_server_error() {
        return ClassifiedError::new(
            ExitCode::SERVER_ERROR,
            Branch::ApiServerError,
            summary("The server encountered an error"),
        )
        .request_id(api.request_id.as_ref())
        .hint(catalog, topics::SERVER_ERROR);
    }

    ClassifiedError::new(
        ExitCode::GENERAL_ERROR,
        Branch::ApiOther,
        summary(&format!("API request failed with status {}", api.status)),
    )
    .request_id(api.request_id.as_ref())
}

/// Catalog summary for the code, with the API's own message appended when it
/// adds something.
fn api_summary(api: &ApiError, catalog: &MessageCatalog, default: &str) -> String {
    let detail = api.message.trim();
    match catalog.api_message(&api.code) {
        Some(mapped) if !detail.is_empty() && !detail.eq_ignore_ascii_case(mapped) => {
            format!("{mapped}: {detail}")
        }
        Some(mapped) => mapped.to_string(),
        None if !detail.is_empty() => detail.to_string(),
        None => default.to_string(),
    }
}

fn classify_usage(usage: &UsageError, catalog: &MessageCatalog) -> ClassifiedError {
    let mut classified = ClassifiedError::new(ExitCode::MISUSE, Branch::Usage, usage.to_string());

    if let Some(candidate) = suggest(&usage.value, &usage.valid, 0) {
        classified = classified.hint_text(format!("Did you mean \"{candidate}\"?"));
    }
    if usage.valid.is_empty() {
        classified.hint(catalog, topics::MISUSE)
    } else {
        classified.hint_text(format!("Valid options: {}", usage.valid.join(", ")))
    }
}

fn classify_http_text(code: ExitCode, text: &str, catalog: &MessageCatalog) -> ClassifiedError {
    let (label, topic) = match code {
        ExitCode::AUTH_REQUIRED => ("Authentication required", topics::AUTH_REQUIRED),
        ExitCode::FORBIDDEN => ("Permission denied", topics::FORBIDDEN),
        ExitCode::NOT_FOUND => ("Resource not found", topics::NOT_FOUND),
        _ => ("Server error", topics::SERVER_ERROR),
    };
    ClassifiedError::new(code, Branch::HttpStatusText, format!("{label} ({text})"))
        .hint(catalog, topic)
}
