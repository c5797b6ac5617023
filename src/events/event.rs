//! # Worker events emitted by execution cells and the lifecycle gate.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Job events**: one execution cell's progress (starting, succeeded, failed, timeout, abandoned, panicked)
//! - **Lifecycle events**: shutdown, rejected submissions, transport teardown
//! - **Subscriber events**: delivery problems inside the fan-out
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Every job produces exactly one terminal event (`JobSucceeded`, `JobFailed`,
//! `TimeoutHit`, `JobAbandoned` or `JobPanicked`), always after its `JobStarting`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use redisvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TimeoutHit)
//!     .with_channel("emails")
//!     .with_job(7)
//!     .with_timeout(Duration::from_millis(20));
//!
//! assert_eq!(ev.kind, EventKind::TimeoutHit);
//! assert_eq!(ev.channel.as_deref(), Some("emails"));
//! assert_eq!(ev.timeout_ms, Some(20));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of worker events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Job events ===
    /// An execution cell spawned the handler.
    ///
    /// Sets: `channel`, `job`, `timeout_ms`
    JobStarting,

    /// The handler returned `Ok(())`.
    ///
    /// Sets: `channel`, `job`, `elapsed_ms`
    JobSucceeded,

    /// The handler returned an error.
    ///
    /// Sets: `channel`, `job`, `elapsed_ms`, `reason`
    JobFailed,

    /// The job's deadline passed with no shutdown involved.
    ///
    /// Sets: `channel`, `job`, `timeout_ms`, `elapsed_ms`
    TimeoutHit,

    /// Shutdown interrupted the job and the remaining budget ran out.
    ///
    /// Sets: `channel`, `job`, `timeout_ms`, `elapsed_ms`
    JobAbandoned,

    /// The handler panicked; the panic is re-raised to the caller.
    ///
    /// Sets: `channel`, `job`, `elapsed_ms`, `reason` (panic message)
    JobPanicked,

    // === Lifecycle events ===
    /// First shutdown request accepted; the stop signal is closed.
    ///
    /// Sets: `channel`
    ShutdownRequested,

    /// A submission was refused (worker stopped, or zero timeout).
    ///
    /// Sets: `channel`, `reason`
    SubmitRejected,

    /// The transport client was torn down.
    ///
    /// Sets: `channel`, `reason` (only if close failed)
    TransportClosed,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `channel` (subscriber name), `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `channel` (subscriber name), `reason`
    SubscriberOverflow,
}

impl EventKind {
    /// `true` for the five kinds that end a job.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventKind::JobSucceeded
                | EventKind::JobFailed
                | EventKind::TimeoutHit
                | EventKind::JobAbandoned
                | EventKind::JobPanicked
        )
    }
}

/// Worker event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Channel of the emitting worker (or subscriber name for subscriber events).
    pub channel: Option<Arc<str>>,
    /// Per-worker job number (starting from 1).
    pub job: Option<u64>,
    /// Declared job timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Time since execution start in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Human-readable reason (errors, panic messages, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            channel: None,
            job: None,
            timeout_ms: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches a channel name.
    #[inline]
    pub fn with_channel(mut self, channel: impl Into<Arc<str>>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attaches a job number.
    #[inline]
    pub fn with_job(mut self, job: u64) -> Self {
        self.job = Some(job);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_channel(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_channel(subscriber)
            .with_reason(info)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::JobStarting);
        let b = Event::new(EventKind::JobSucceeded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn huge_durations_saturate() {
        let ev = Event::new(EventKind::JobAbandoned).with_elapsed(Duration::from_secs(u64::MAX));
        assert_eq!(ev.elapsed_ms, Some(u32::MAX));
    }

    #[test]
    fn terminal_kinds() {
        assert!(EventKind::JobPanicked.is_terminal());
        assert!(EventKind::TimeoutHit.is_terminal());
        assert!(!EventKind::JobStarting.is_terminal());
        assert!(!EventKind::ShutdownRequested.is_terminal());
    }
}
