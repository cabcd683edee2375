use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use probectl_config::{EnvOverrides, PreferenceStore, resolve_telemetry};
use probectl_utils::ExitCode;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::debug;

use crate::event::TelemetryEvent;
use crate::sink::{DEFAULT_ENDPOINT, EventSink, HttpSink, NoopSink};

/// Upper bound on concurrent sends. Events past it are dropped.
pub const MAX_IN_FLIGHT: usize = 16;

/// How long the dispatch loop waits for pending sends before exiting.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-invocation telemetry dispatcher.
///
/// Constructed once by the entry point and passed down; tests build their own
/// with [`TelemetryClient::with_sink`].
pub struct TelemetryClient {
    enabled: AtomicBool,
    version: String,
    org_id: Option<String>,
    last_event: Mutex<Option<TelemetryEvent>>,
    sink: Arc<dyn EventSink>,
    tracker: TaskTracker,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for TelemetryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryClient")
            .field("enabled", &self.is_enabled())
            .field("version", &self.version)
            .field("in_flight", &self.tracker.len())
            .finish_non_exhaustive()
    }
}

impl TelemetryClient {
    pub fn with_sink(enabled: bool, org_id: Option<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            version: env!("CARGO_PKG_VERSION").to_string(),
            org_id,
            last_event: Mutex::new(None),
            sink,
            tracker: TaskTracker::new(),
            permits: Arc::new(Semaphore::new(MAX_IN_FLIGHT)),
        }
    }

    /// Client that never sends anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::with_sink(false, None, Arc::new(NoopSink))
    }

    /// Resolve the enabled flag and endpoint from environment overrides and
    /// persisted preferences.
    ///
    /// Never fails: if the HTTP transport cannot be built, telemetry is
    /// disabled for this invocation.
    pub fn from_config<P: PreferenceStore + ?Sized>(env: &EnvOverrides, prefs: &P) -> Self {
        let (enabled, source) = resolve_telemetry(env, prefs);
        let endpoint = env
            .telemetry_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT);
        debug!(enabled, %source, endpoint, "resolved telemetry settings");

        match HttpSink::new(endpoint) {
            Ok(sink) => Self::with_sink(enabled, prefs.org_id(), Arc::new(sink)),
            Err(err) => {
                debug!(error = %err, "telemetry transport unavailable; disabling");
                Self::disabled()
            }
        }
    }

    /// Override the reported client version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// The most recently submitted event.
    #[must_use]
    pub fn last_event(&self) -> Option<TelemetryEvent> {
        self.last_event
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record one invocation and submit it in the background.
    ///
    /// Returns immediately. Does nothing when disabled. The event is still
    /// recorded as the last event but not sent when no tokio runtime is
    /// current or [`MAX_IN_FLIGHT`] sends are already pending.
    pub fn track(&self, command_text: &str, exit_code: ExitCode, duration: Duration) {
        if !self.is_enabled() {
            return;
        }

        let event = TelemetryEvent::new(
            &self.version,
            command_text,
            exit_code,
            duration,
            self.org_id.as_deref(),
        );
        *self
            .last_event
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(event.clone());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime; telemetry event not sent");
            return;
        };
        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            debug!(limit = MAX_IN_FLIGHT, "too many telemetry sends pending; event dropped");
            return;
        };

        let sink = Arc::clone(&self.sink);
        self.tracker.spawn_on(
            async move {
                let _permit = permit;
                match sink.send(&event).await {
                    Ok(()) => debug!(command = %event.command, "telemetry event sent"),
                    Err(err) => debug!(error = %err, "telemetry event discarded"),
                }
            },
            &runtime,
        );
    }

    /// Wait for pending sends, at most `timeout`.
    ///
    /// Returns `true` when everything finished in time. Sends still running
    /// after the timeout are left alone.
    pub async fn flush(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();

        if !drained {
            debug!(pending = self.tracker.len(), "telemetry flush timed out");
        }
        drained
    }
}
