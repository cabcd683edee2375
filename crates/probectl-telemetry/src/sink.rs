//! Event transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::event::TelemetryEvent;

/// Collection endpoint used unless `PROBECTL_TELEMETRY_ENDPOINT` is set.
pub const DEFAULT_ENDPOINT: &str = "https://telemetry.probectl.dev/v1/events";

/// Total time allowed for one send, connect included.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build telemetry HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("telemetry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telemetry endpoint returned HTTP {status}")]
    Status { status: u16 },
}

/// Destination for telemetry events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// `probectl/<version> (<os>; <arch>)`
#[must_use]
pub fn user_agent() -> String {
    format!(
        "probectl/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// POSTs events as JSON.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    endpoint: String,
}

impl HttpSink {
    /// # Errors
    ///
    /// Returns [`TelemetryError::Client`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TelemetryError> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .user_agent(user_agent())
            .build()
            .map_err(TelemetryError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventSink for HttpSink {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let response = self.client.post(&self.endpoint).json(event).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TelemetryError::Status {
                status: status.as_u16(),
            })
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl EventSink for NoopSink {
    async fn send(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}
