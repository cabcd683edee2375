//! Closed set of error shapes the classifier understands, plus the adaptation
//! layer that builds them from concrete error types.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use thiserror::Error;

use crate::api::ApiError;

/// Marker error for an operation abandoned because its cancellation token
/// fired.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("operation canceled")]
pub struct Cancelled;

/// A value outside a fixed set of valid options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {subject} \"{value}\"")]
pub struct UsageError {
    pub subject: String,
    pub value: String,
    pub valid: Vec<String>,
}

impl UsageError {
    pub fn new<S: AsRef<str>>(
        subject: impl Into<String>,
        value: impl Into<String>,
        valid: &[S],
    ) -> Self {
        Self {
            subject: subject.into(),
            value: value.into(),
            valid: valid.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }
}

/// Error with a timeout flag that may wrap a more specific cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFault {
    pub message: String,
    pub timed_out: bool,
    pub cause: Option<Box<Fault>>,
}

/// Specific connection-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFault {
    Dns { host: String, message: String },
    ConnectionRefused { message: String },
    ConnectionReset { message: String },
}

/// Failures that come from the surrounding context rather than the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFault {
    DeadlineExceeded,
    Cancelled,
}

/// Tagged error variants consumed by [`classify`](crate::classify::classify).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Api(ApiError),
    Usage(UsageError),
    Transport(TransportFault),
    Network(NetworkFault),
    Context(ContextFault),
    Opaque(String),
}

impl Fault {
    pub fn opaque(message: impl Into<String>) -> Self {
        Self::Opaque(message.into())
    }

    /// Short variant name for debug diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Api(_) => "api",
            Self::Usage(_) => "usage",
            Self::Transport(_) => "transport",
            Self::Network(NetworkFault::Dns { .. }) => "network.dns",
            Self::Network(NetworkFault::ConnectionRefused { .. }) => "network.refused",
            Self::Network(NetworkFault::ConnectionReset { .. }) => "network.reset",
            Self::Context(ContextFault::DeadlineExceeded) => "context.deadline",
            Self::Context(ContextFault::Cancelled) => "context.canceled",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Adapt an `anyhow` error by walking its chain for known types.
    ///
    /// The first recognised link wins. When nothing is recognised the full
    /// chain text becomes an opaque fault.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(fault) = Self::from_known(cause) {
                return fault;
            }
        }
        Self::Opaque(format!("{err:#}"))
    }

    fn from_known(err: &(dyn StdError + 'static)) -> Option<Self> {
        if let Some(api) = err.downcast_ref::<ApiError>() {
            return Some(Self::Api(api.clone()));
        }
        if let Some(usage) = err.downcast_ref::<UsageError>() {
            return Some(Self::Usage(usage.clone()));
        }
        if err.downcast_ref::<Cancelled>().is_some() {
            return Some(Self::Context(ContextFault::Cancelled));
        }
        if err.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
            return Some(Self::Context(ContextFault::DeadlineExceeded));
        }
        if let Some(req) = err.downcast_ref::<reqwest::Error>() {
            return Some(Self::from(req));
        }
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return Self::from_socket_error(io_err);
        }
        None
    }

    /// Only socket-level kinds are trusted outside a transport. Broken pipes,
    /// timeouts and the rest also come from local files and pipes, so they
    /// fall through to the chain text with its context intact.
    fn from_socket_error(err: &io::Error) -> Option<Self> {
        match err.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => Some(Self::from(err)),
            _ => None,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Usage(err) => write!(f, "{err}"),
            Self::Transport(t) => write!(f, "{}", t.message),
            Self::Network(
                NetworkFault::Dns { message, .. }
                | NetworkFault::ConnectionRefused { message }
                | NetworkFault::ConnectionReset { message },
            ) => write!(f, "{message}"),
            Self::Context(ContextFault::DeadlineExceeded) => write!(f, "deadline exceeded"),
            Self::Context(ContextFault::Cancelled) => write!(f, "{}", Cancelled),
            Self::Opaque(message) => write!(f, "{message}"),
        }
    }
}

impl From<ApiError> for Fault {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<UsageError> for Fault {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}

impl From<&io::Error> for Fault {
    fn from(err: &io::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            io::ErrorKind::ConnectionRefused => {
                Self::Network(NetworkFault::ConnectionRefused { message })
            }
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Network(NetworkFault::ConnectionReset { message }),
            io::ErrorKind::TimedOut => Self::Transport(TransportFault {
                message,
                timed_out: true,
                cause: None,
            }),
            _ => Self::Opaque(message),
        }
    }
}

/// Adapt a `reqwest` error into a transport fault.
///
/// The URL wrapper carries the timeout flag; the inner cause is the first
/// `io::Error` in its source chain, or a DNS fault when the chain reports a
/// failed lookup.
impl From<&reqwest::Error> for Fault {
    fn from(err: &reqwest::Error) -> Self {
        let message = error_chain_text(err);
        let timed_out = err.is_timeout();

        let cause = if timed_out {
            None
        } else {
            inner_cause(err, &message)
        };

        Self::Transport(TransportFault {
            message,
            timed_out,
            cause: cause.map(Box::new),
        })
    }
}

fn inner_cause(err: &reqwest::Error, message: &str) -> Option<Fault> {
    let lower = message.to_lowercase();
    if lower.contains("dns error") || lower.contains("failed to lookup address") {
        let host = err
            .url()
            .and_then(|url| url.host_str())
            .unwrap_or("unknown host")
            .to_string();
        return Some(Fault::Network(NetworkFault::Dns {
            host,
            message: message.to_string(),
        }));
    }

    let mut source = err.source();
    while let Some(link) = source {
        if let Some(io_err) = link.downcast_ref::<io::Error>() {
            return Some(Fault::from(io_err));
        }
        source = link.source();
    }
    None
}

/// `outer: inner: innermost`, the way `anyhow` renders `{:#}`.
fn error_chain_text(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(link) = source {
        let part = link.to_string();
        if !text.contains(&part) {
            text.push_str(": ");
            text.push_str(&part);
        }
        source = link.source();
    }
    text
}
