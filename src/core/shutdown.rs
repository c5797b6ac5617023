//! # Shutdown coordinator: one-shot Active → ShuttingDown transition.
//!
//! ```text
//! shutdown() ──► CAS stopped false→true ──┬─ lost  ─► Err(Shutdown)
//!                                          └─ won   ─► stop.cancel()   (releases every cell)
//!                                                      teardown (once, own task):
//!                                                        └─► transport close
//! ```
//!
//! ## Rules
//! - `stopped` only ever goes false → true
//! - the stop signal is a [`CancellationToken`]: closed once, observed by any
//!   number of waiters, never consumed
//! - teardown runs under its own single-execution guard, independent of the flag
//! - teardown is spawned, so it completes even if the winning caller's future is dropped
//! - `ShuttingDown` is terminal for the worker instance

use std::future::Future;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

/// Process-wide (per worker) shutdown state.
#[derive(Debug, Default)]
pub(crate) struct Coordinator {
    stopped: AtomicBool,
    stop: CancellationToken,
    teardown: OnceLock<()>,
}

impl Coordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `true` once a shutdown request won the transition.
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// `true` once the stop signal is closed.
    pub(crate) fn is_signalled(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// The stop signal shared with every execution cell.
    pub(crate) fn signal(&self) -> &CancellationToken {
        &self.stop
    }

    /// Performs the transition, closing the stop signal and running `release`
    /// exactly once on a task of its own. Later calls get [`WorkerError::Shutdown`].
    ///
    /// The winning call waits for `release` to finish; dropping that call
    /// does not stop it.
    pub(crate) async fn shutdown<F, Fut>(&self, release: F) -> Result<(), WorkerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerError::Shutdown);
        }

        self.stop.cancel();
        if self.teardown.set(()).is_err() {
            return Ok(());
        }
        if let Err(e) = tokio::spawn(release()).await {
            tracing::error!(error = %e, "shutdown teardown did not complete");
        }
        Ok(())
    }
}
