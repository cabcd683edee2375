//! CLI argument definitions (clap).

use clap::{Parser, Subcommand};

/// Seconds allowed for `ping` before it fails with a timeout.
pub const DEFAULT_PING_TIMEOUT_SECS: u64 = 10;

/// probectl - manage uptime probes, alerts and channels
#[derive(Parser, Debug)]
#[command(name = "probectl")]
#[command(about = "Command-line client for the probectl monitoring API")]
#[command(long_about = r#"
probectl talks to the probectl monitoring API.

EXAMPLES:
  # Check that the API is reachable
  probectl ping

  # Inspect and change the telemetry preference
  probectl telemetry status
  probectl telemetry disable

ENVIRONMENT:
  PROBECTL_TELEMETRY            Force telemetry on (1/true/yes/on) or off (0/false/no/off)
  PROBECTL_DEBUG                Print classification diagnostics before error messages
  PROBECTL_API_URL              Override the API base URL
  PROBECTL_TELEMETRY_ENDPOINT   Override the telemetry collection endpoint
  PROBECTL_CONFIG_DIR           Directory holding config.toml

EXIT CODES:
  0 success, 1 general error, 2 misuse, 3 authentication required,
  4 forbidden, 5 not found, 6 rate limited, 7 server error, 8 network,
  9 timeout, 10 plan limit, 130 interrupted (SIGINT), 143 terminated (SIGTERM)
"#)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: table, json or yaml
    #[arg(short, long, global = true, default_value = "table")]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show or change the usage telemetry preference
    #[command(subcommand)]
    Telemetry(TelemetryCommands),

    /// Check that the API answers its health endpoint
    Ping {
        /// Seconds to wait for a response
        #[arg(long, default_value_t = DEFAULT_PING_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Print the client version
    Version,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryCommands {
    /// Show whether telemetry is on and which setting decided it
    Status,
    /// Turn telemetry on
    Enable,
    /// Turn telemetry off
    Disable,
}

impl Commands {
    /// Subcommand path without arguments, as reported in telemetry and logs.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Telemetry(TelemetryCommands::Status) => "telemetry status",
            Self::Telemetry(TelemetryCommands::Enable) => "telemetry enable",
            Self::Telemetry(TelemetryCommands::Disable) => "telemetry disable",
            Self::Ping { .. } => "ping",
            Self::Version => "version",
        }
    }
}

/// Build the clap command, for tests and completion generation.
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
