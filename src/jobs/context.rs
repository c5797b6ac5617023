//! # Cancellable, deadline-bound job context.
//!
//! [`JobContext`] is what a handler receives alongside its [`Job`](crate::Job).
//! It combines a [`CancellationToken`] with a monotonic deadline so that a
//! handler can wait for "done" without caring which of the two fired, and can
//! still ask why afterwards.
//!
//! ## Rules
//! - `cancelled()` completes on explicit cancellation **or** when the deadline passes
//! - `err()` is `None` while the context is live
//! - the first recorded cause wins; cancellation without a recorded cause reads
//!   as `DeadlineExceeded` if the deadline already passed, `Canceled` otherwise
//! - clones share the same token, deadline and cause

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::ContextError;

/// Context handed to a handler for one job execution.
#[derive(Clone, Debug)]
pub struct JobContext {
    token: CancellationToken,
    deadline: Instant,
    cause: Arc<OnceLock<ContextError>>,
}

impl JobContext {
    /// Creates a context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline,
            cause: Arc::new(OnceLock::new()),
        }
    }

    /// The instant this context expires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until the deadline (zero once passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// `true` once cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes when the context is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = time::sleep_until(self.deadline) => {}
        }
    }

    /// Why the context is done, or `None` while it is live.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(self.cause.get().copied().unwrap_or_else(|| self.expired_or_canceled()));
        }
        (Instant::now() >= self.deadline).then_some(ContextError::DeadlineExceeded)
    }

    /// Cancels the context, recording `cause` if none was recorded before.
    pub(crate) fn cancel_with(&self, cause: ContextError) {
        let _ = self.cause.set(cause);
        self.token.cancel();
    }

    /// Cancels the context when the returned guard is dropped.
    pub(crate) fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    fn expired_or_canceled(&self) -> ContextError {
        if Instant::now() >= self.deadline {
            ContextError::DeadlineExceeded
        } else {
            ContextError::Canceled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn live_until_deadline() {
        let ctx = JobContext::with_timeout(Duration::from_millis(100));
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.err(), None);

        ctx.cancelled().await;

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cancel_wins_before_deadline() {
        let ctx = JobContext::with_timeout(Duration::from_secs(3));
        let seen = ctx.clone();

        ctx.cancel_with(ContextError::Canceled);
        seen.cancelled().await;

        assert_eq!(seen.err(), Some(ContextError::Canceled));
        assert!(seen.remaining() > Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn first_cause_is_kept() {
        let ctx = JobContext::with_timeout(Duration::from_secs(1));
        ctx.cancel_with(ContextError::DeadlineExceeded);
        ctx.cancel_with(ContextError::Canceled);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_guard_cancels_as_canceled() {
        let ctx = JobContext::with_timeout(Duration::from_secs(1));
        drop(ctx.drop_guard());
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }
}
