//! Graceful shutdown for a single probectl invocation.
//!
//! [`install`] starts a listener for SIGINT and SIGTERM and hands back a
//! [`CancellationToken`] plus a [`ShutdownHandle`]. The first signal wins: it
//! is recorded, the token is cancelled, and the listener exits. Cancellation
//! is advisory; work holding the token is expected to stop on its own.
//!
//! The dispatch loop then:
//!
//! 1. asks [`ShutdownHandle::resolve_exit_code`] whether a signal overrides the
//!    command's own exit code (130 for SIGINT, 143 for SIGTERM),
//! 2. runs registered cleanups once, most recent first, via
//!    [`ShutdownHandle::run_cleanups`],
//! 3. calls [`ShutdownHandle::cancel`] to release the listener.
//!
//! Cleanup actions are expected to be infallible or to handle their own
//! errors; a panicking action is not caught.
//!
//! Once a signal stream is registered, tokio keeps its process-wide handler
//! until exit. Signals arriving after the first are absorbed rather than
//! restoring the default disposition, so a second Ctrl+C does not kill the
//! process. Exit stays prompt because the dispatch loop only waits on bounded
//! steps after cancellation.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use probectl_utils::ExitCode;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use tokio_util::sync::CancellationToken;

/// A handled termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    /// Conventional `128 + signo` exit code.
    #[must_use]
    pub const fn exit_code(self) -> ExitCode {
        match self {
            Self::Interrupt => ExitCode::INTERRUPTED,
            Self::Terminate => ExitCode::TERMINATED,
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Errors reported while installing the signal listener.
#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to install signal handlers: {source}")]
    Install {
        #[source]
        source: io::Error,
    },

    #[error("signal handlers require a running tokio runtime")]
    NoRuntime,
}

type CleanupAction = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    /// `None` once drained.
    cleanups: Mutex<Option<Vec<CleanupAction>>>,
    signal: Mutex<Option<ShutdownSignal>>,
    token: CancellationToken,
    stop_listener: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration and query handle for one coordinator.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("signal", &self.signal())
            .field("cancelled", &self.shared.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Install the coordinator for this process invocation.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error when no runtime is available or signal registration
/// fails. Callers treat either as fatal.
pub fn install() -> Result<(CancellationToken, ShutdownHandle), ShutdownError> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| ShutdownError::NoRuntime)?;
    let streams = {
        let _guard = runtime.enter();
        SignalStreams::register().map_err(|source| ShutdownError::Install { source })?
    };

    let (token, handle) = ShutdownHandle::new();
    let listener = runtime.spawn(listen(handle.clone(), streams));
    *lock(&handle.shared.listener) = Some(listener);

    debug!("shutdown coordinator installed");
    Ok((token, handle))
}

async fn listen(handle: ShutdownHandle, mut streams: SignalStreams) {
    let stop = handle.shared.stop_listener.clone();
    let token = handle.shared.token.clone();

    let signal = tokio::select! {
        biased;
        () = stop.cancelled() => None,
        () = token.cancelled() => None,
        signal = streams.recv() => signal,
    };

    if let Some(signal) = signal {
        handle.notify(signal);
    }
}

impl ShutdownHandle {
    /// Coordinator with no signal listener attached.
    ///
    /// Signals are delivered through [`notify`](Self::notify).
    #[must_use]
    pub fn new() -> (CancellationToken, Self) {
        let token = CancellationToken::new();
        let handle = Self {
            shared: Arc::new(Shared {
                cleanups: Mutex::new(Some(Vec::new())),
                signal: Mutex::new(None),
                token: token.clone(),
                stop_listener: CancellationToken::new(),
                listener: Mutex::new(None),
            }),
        };
        (token, handle)
    }

    /// Record a signal and cancel the token.
    ///
    /// Only the first signal is kept; returns whether this call recorded it.
    pub fn notify(&self, signal: ShutdownSignal) -> bool {
        {
            let mut state = lock(&self.shared.signal);
            if let Some(existing) = *state {
                debug!(%signal, %existing, "ignoring signal, one already recorded");
                return false;
            }
            *state = Some(signal);
        }

        debug!(%signal, "shutdown signal received");
        self.shared.token.cancel();
        true
    }

    /// The recorded signal, if any.
    #[must_use]
    pub fn signal(&self) -> Option<ShutdownSignal> {
        *lock(&self.shared.signal)
    }

    /// Register a cleanup action.
    ///
    /// Actions registered after [`run_cleanups`](Self::run_cleanups) are
    /// dropped without running.
    pub fn on_cleanup<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match lock(&self.shared.cleanups).as_mut() {
            Some(actions) => actions.push(Box::new(action)),
            None => warn!("cleanup registered after shutdown cleanups already ran; ignoring"),
        }
    }

    /// Run registered cleanups, most recently registered first.
    ///
    /// The first call drains the registry; later calls, concurrent or not,
    /// do nothing. Returns how many actions ran.
    pub fn run_cleanups(&self) -> usize {
        let drained = lock(&self.shared.cleanups).take();
        let Some(actions) = drained else {
            return 0;
        };

        let count = actions.len();
        for action in actions.into_iter().rev() {
            action();
        }
        debug!(count, "ran shutdown cleanups");
        count
    }

    /// The signal-derived code if a signal was recorded, else `candidate`.
    #[must_use]
    pub fn resolve_exit_code(&self, candidate: ExitCode) -> ExitCode {
        self.signal()
            .map_or(candidate, ShutdownSignal::exit_code)
    }

    /// Stop the signal listener. Call on every exit path.
    ///
    /// Does not cancel the token handed out by [`install`].
    pub fn cancel(&self) {
        self.shared.stop_listener.cancel();
        if let Some(listener) = lock(&self.shared.listener).take() {
            listener.abort();
        }
    }

    #[cfg(test)]
    fn is_listening(&self) -> bool {
        lock(&self.shared.listener)
            .as_ref()
            .is_some_and(|listener| !listener.is_finished())
    }
}

#[cfg(unix)]
struct SignalStreams {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalStreams {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            else => None,
        }
    }
}

#[cfg(not(unix))]
struct SignalStreams {
    interrupt: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl SignalStreams {
    fn register() -> io::Result<Self> {
        Ok(Self {
            interrupt: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Option<ShutdownSignal> {
        self.interrupt
            .recv()
            .await
            .map(|()| ShutdownSignal::Interrupt)
    }
}
