//! CLI entry point and dispatch loop.
//!
//! `run()` owns all output, errors included. One invocation:
//!
//! 1. install the shutdown coordinator (fatal on failure)
//! 2. run the command raced against the cancellation token
//! 3. classify any error into an exit code, printing its message block
//! 4. let a received signal override that code
//! 5. record telemetry and flush it with a bounded wait
//! 6. run registered cleanups, then release the signal listener

use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use probectl_config::{EnvOverrides, PreferenceFile, Preferences};
use probectl_error_reporter::{Cancelled, ErrorReporter, MessageCatalog};
use probectl_shutdown::CancellationToken;
use probectl_telemetry::{DEFAULT_FLUSH_TIMEOUT, TelemetryClient};
use probectl_utils::ExitCode;
use probectl_utils::logging::{command_span, init_tracing};
use tracing::{Instrument, debug};

use super::args::{Cli, Commands, TelemetryCommands};
use super::commands::{self, CommandContext};
use super::output::OutputFormat;

/// Main CLI execution function.
///
/// Returns `Err(code)` for every non-zero outcome; `main` only maps it to the
/// process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let env = EnvOverrides::from_env();

    if let Err(err) = init_tracing(cli.verbose || env.debug_enabled()) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to create async runtime: {err}");
            return Err(ExitCode::GENERAL_ERROR);
        }
    };

    let code = runtime.block_on(dispatch(cli, &env));
    // Sends abandoned by a timed-out flush must not hold the process open.
    runtime.shutdown_background();

    if code.is_success() { Ok(()) } else { Err(code) }
}

/// Run one parsed invocation to completion and return its exit code.
pub async fn dispatch(cli: Cli, env: &EnvOverrides) -> ExitCode {
    let (token, shutdown) = match probectl_shutdown::install() {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::GENERAL_ERROR;
        }
    };
    shutdown.on_cleanup(|| {
        let _ = io::stdout().flush();
    });

    let reporter = ErrorReporter::new(MessageCatalog::default(), env.debug_enabled());
    let loaded = load_preferences(env);
    let defaults = Preferences::default();
    let telemetry =
        TelemetryClient::from_config(env, loaded.as_ref().map_or(&defaults, |(_, prefs)| prefs));

    let command_path = cli.command.path();
    let started = Instant::now();

    let outcome = match loaded {
        Ok((file, preferences)) => {
            execute(&cli, env, &file, &preferences, &telemetry, &token)
                .instrument(command_span(command_path))
                .await
        }
        Err(err) => Err(err),
    };

    let candidate = match &outcome {
        Ok(stdout) => {
            write_stdout(&mut io::stdout().lock(), stdout);
            ExitCode::SUCCESS
        }
        Err(err) => reporter.report_anyhow(Some(err), &mut io::stderr()),
    };

    let code = shutdown.resolve_exit_code(candidate);
    debug!(command = command_path, %candidate, %code, "command finished");

    telemetry.track(command_path, code, started.elapsed());
    telemetry.flush(DEFAULT_FLUSH_TIMEOUT).await;

    shutdown.run_cleanups();
    shutdown.cancel();
    code
}

/// A closed stdout (`probectl ... | head`) is not a command failure.
fn write_stdout<W: Write>(out: &mut W, text: &str) {
    if let Err(err) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        debug!(error = %err, "could not write command output");
    }
}

fn load_preferences(env: &EnvOverrides) -> Result<(PreferenceFile, Preferences)> {
    let file = PreferenceFile::discover(env).context("Failed to locate configuration directory")?;
    let preferences = file.load()?;
    Ok((file, preferences))
}

async fn execute(
    cli: &Cli,
    env: &EnvOverrides,
    preference_file: &PreferenceFile,
    preferences: &Preferences,
    telemetry: &TelemetryClient,
    token: &CancellationToken,
) -> Result<String> {
    let output: OutputFormat = cli.output.parse()?;
    let ctx = CommandContext {
        env,
        preference_file,
        preferences,
        output,
        telemetry,
    };

    let work = async {
        match &cli.command {
            Commands::Telemetry(TelemetryCommands::Status) => Ok(commands::telemetry_status(&ctx)),
            Commands::Telemetry(TelemetryCommands::Enable) => commands::telemetry_set(&ctx, true),
            Commands::Telemetry(TelemetryCommands::Disable) => commands::telemetry_set(&ctx, false),
            Commands::Ping { timeout } => commands::ping(&ctx, *timeout).await,
            Commands::Version => Ok(commands::version(output)),
        }
    };

    tokio::select! {
        biased;
        () = token.cancelled() => Err(Cancelled.into()),
        result = work => result,
    }
}
