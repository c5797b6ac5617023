//! # LogWriter: tracing-backed event logger
//!
//! A subscriber that renders every [`Event`] through `tracing`, with the
//! event's metadata as structured fields. Install any `tracing` subscriber
//! (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Levels
//! - `info`: job starting/succeeded, shutdown requested, transport closed
//! - `warn`: job failed, timeout, abandoned, rejected submission, subscriber overflow
//! - `error`: handler or subscriber panic, transport close failure

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let channel = e.channel.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::JobStarting => {
                info!(channel, job = e.job, timeout_ms = e.timeout_ms, "job starting");
            }
            EventKind::JobSucceeded => {
                info!(channel, job = e.job, elapsed_ms = e.elapsed_ms, "job succeeded");
            }
            EventKind::JobFailed => {
                warn!(channel, job = e.job, elapsed_ms = e.elapsed_ms, error = reason, "job failed");
            }
            EventKind::TimeoutHit => {
                warn!(channel, job = e.job, timeout_ms = e.timeout_ms, "job deadline exceeded");
            }
            EventKind::JobAbandoned => {
                warn!(
                    channel,
                    job = e.job,
                    timeout_ms = e.timeout_ms,
                    elapsed_ms = e.elapsed_ms,
                    "job abandoned after shutdown"
                );
            }
            EventKind::JobPanicked => {
                error!(channel, job = e.job, panic = reason, "job handler panicked");
            }
            EventKind::ShutdownRequested => {
                info!(channel, "shutdown requested");
            }
            EventKind::SubmitRejected => {
                warn!(channel, reason, "submission rejected");
            }
            EventKind::TransportClosed => match e.reason.as_deref() {
                Some(err) => error!(channel, error = err, "transport close failed"),
                None => info!(channel, "transport closed"),
            },
            EventKind::SubscriberOverflow => {
                warn!(subscriber = channel, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = channel, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
