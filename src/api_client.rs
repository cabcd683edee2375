//! Minimal client for the probectl API.
//!
//! Non-2xx responses become [`ApiError`] values with the HTTP status,
//! `X-Request-Id` and `Retry-After` headers filled in. Transport failures are
//! returned as `reqwest` errors; the error reporter knows how to read both.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use probectl_error_reporter::ApiError;
use probectl_telemetry::user_agent;
use reqwest::{Client, Response, header::HeaderMap};
use serde::Deserialize;
use tracing::debug;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body of `GET /v1/health`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub status: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub http_status: u16,
    pub latency: Duration,
    pub report: HealthReport,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthCheck> {
        let url = format!("{}/v1/health", self.base_url);
        debug!(%url, "checking API health");

        let started = Instant::now();
        let response = self.client.get(&url).send().await?;
        let latency = started.elapsed();

        let response = check_status(response).await?;
        let http_status = response.status().as_u16();
        let body = response.text().await?;
        let report = serde_json::from_str(&body).unwrap_or_default();

        Ok(HealthCheck {
            http_status,
            latency,
            report,
        })
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    Err(api_error_from_parts(status.as_u16(), &headers, &body).into())
}

/// Assemble an [`ApiError`] from a failed response.
///
/// A body that is not a JSON error object still yields an error carrying the
/// status; the reporter then falls back to its own summary for that status.
pub fn api_error_from_parts(status: u16, headers: &HeaderMap, body: &str) -> ApiError {
    let mut err: ApiError = serde_json::from_str(body).unwrap_or_default();
    err.status = status;

    if err.request_id.is_none() {
        err.request_id = header_str(headers, REQUEST_ID_HEADER).map(str::to_string);
    }
    err.retry_after_secs = header_str(headers, reqwest::header::RETRY_AFTER.as_str())
        .and_then(|value| value.trim().parse().ok());

    err
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
