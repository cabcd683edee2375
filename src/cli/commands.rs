//! Command implementations.
//!
//! Each command returns its rendered stdout text; failures are returned as
//! errors and reported by the dispatch loop, never printed here.

use std::time::Duration;

use anyhow::{Context, Result};
use probectl_config::{EnvOverrides, PreferenceFile, Preferences, resolve_telemetry};
use probectl_telemetry::TelemetryClient;
use serde_json::json;
use tracing::warn;

use super::output::{OutputFormat, render_record};
use crate::api_client::ApiClient;

/// Everything a command may read or update.
pub struct CommandContext<'a> {
    pub env: &'a EnvOverrides,
    pub preference_file: &'a PreferenceFile,
    pub preferences: &'a Preferences,
    pub output: OutputFormat,
    pub telemetry: &'a TelemetryClient,
}

pub fn telemetry_status(ctx: &CommandContext<'_>) -> String {
    let (enabled, source) = resolve_telemetry(ctx.env, ctx.preferences);
    render_record(
        ctx.output,
        &[
            ("enabled", json!(enabled)),
            ("source", json!(source.to_string())),
            ("config_file", json!(ctx.preference_file.path().display().to_string())),
        ],
    )
}

/// Persist the telemetry preference and apply it to the live client.
pub fn telemetry_set(ctx: &CommandContext<'_>, enabled: bool) -> Result<String> {
    let mut preferences = ctx.preferences.clone();
    preferences.telemetry = Some(enabled);
    ctx.preference_file
        .save(&preferences)
        .context("Failed to save telemetry preference")?;

    let (effective, source) = resolve_telemetry(ctx.env, &preferences);
    ctx.telemetry.set_enabled(effective);
    if effective != enabled {
        warn!(
            saved = enabled,
            effective,
            "PROBECTL_TELEMETRY overrides the saved telemetry preference"
        );
    }

    Ok(render_record(
        ctx.output,
        &[
            ("enabled", json!(effective)),
            ("source", json!(source.to_string())),
            ("saved", json!(enabled)),
        ],
    ))
}

pub async fn ping(ctx: &CommandContext<'_>, timeout_secs: u64) -> Result<String> {
    let client = ApiClient::new(ctx.preferences.api_url(ctx.env), Duration::from_secs(timeout_secs))?;
    let check = client
        .health()
        .await
        .with_context(|| format!("Failed to reach {}", client.base_url()))?;

    let latency_ms = u64::try_from(check.latency.as_millis()).unwrap_or(u64::MAX);
    Ok(render_record(
        ctx.output,
        &[
            ("api_url", json!(client.base_url())),
            ("status", json!(check.report.status.as_deref().unwrap_or("ok"))),
            ("http_status", json!(check.http_status)),
            ("latency_ms", json!(latency_ms)),
            ("server_version", json!(check.report.version)),
        ],
    ))
}

pub fn version(output: OutputFormat) -> String {
    render_record(
        output,
        &[
            ("version", json!(env!("CARGO_PKG_VERSION"))),
            (
                "platform",
                json!(format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)),
            ),
        ],
    )
}
