//! Error types used by the worker and by job execution.
//!
//! This module defines three enums:
//!
//! - [`WorkerError`] errors raised by the worker's lifecycle gate and construction.
//! - [`JobError`] terminal failure outcomes of a single job execution.
//! - [`ContextError`] why a [`JobContext`](crate::JobContext) is done.
//!
//! `WorkerError` and `JobError` provide `as_label` for logs and events.

use std::time::Duration;
use thiserror::Error;

/// Error value returned by a [`Handler`](crate::Handler). Propagated verbatim.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by the worker itself.
///
/// `Shutdown` is what every caller of `submit`, `run_state` and the second
/// `shutdown` observes once the worker has transitioned to shutting down.
/// It is never retried internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker has been shut down; no new work is accepted.
    #[error("worker has been shut down")]
    Shutdown,

    /// A job was submitted with a zero timeout.
    #[error("job timeout must be greater than zero")]
    ZeroTimeout,

    /// Construction options could not be turned into a transport.
    #[error("invalid worker configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the options.
        reason: String,
    },

    /// The transport client failed (connect, ping, close).
    #[error("transport error: {0}")]
    Transport(#[from] redis::RedisError),
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use redisvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::Shutdown.as_label(), "worker_shutdown");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Shutdown => "worker_shutdown",
            WorkerError::ZeroTimeout => "worker_zero_timeout",
            WorkerError::InvalidConfig { .. } => "worker_invalid_config",
            WorkerError::Transport(_) => "worker_transport",
        }
    }

    /// Returns `true` for [`WorkerError::Shutdown`].
    pub fn is_shutdown(&self) -> bool {
        matches!(self, WorkerError::Shutdown)
    }
}

/// # Terminal failure outcome of one job.
///
/// Success is `Ok(())`; a handler panic is never turned into a `JobError`,
/// it is re-raised in the caller of [`Worker::execute`](crate::Worker::execute).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// The error returned by the handler, untouched.
    #[error(transparent)]
    Handler(HandlerError),

    /// The job's own timeout elapsed with no shutdown involved.
    #[error("deadline exceeded after {timeout:?}")]
    DeadlineExceeded {
        /// The job's declared timeout.
        timeout: Duration,
    },

    /// Shutdown interrupted the job and the handler did not finish within
    /// the remaining budget. The handler may still be running.
    #[error("deadline exceeded after {timeout:?} (abandoned on shutdown, elapsed {elapsed:?})")]
    Abandoned {
        /// The job's declared timeout.
        timeout: Duration,
        /// Time from execution start until the cell gave up.
        elapsed: Duration,
    },

    /// The job carried a zero timeout and was never started.
    #[error("job timeout must be greater than zero")]
    ZeroTimeout,
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use redisvisor::JobError;
    /// use std::time::Duration;
    ///
    /// let err = JobError::DeadlineExceeded { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "job_deadline_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Handler(_) => "job_handler_error",
            JobError::DeadlineExceeded { .. } => "job_deadline_exceeded",
            JobError::Abandoned { .. } => "job_abandoned",
            JobError::ZeroTimeout => "job_zero_timeout",
        }
    }

    /// Both the plain timeout and the shutdown abandonment report a deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(
            self,
            JobError::DeadlineExceeded { .. } | JobError::Abandoned { .. }
        )
    }

    /// Returns `true` only when the job was abandoned after a shutdown.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, JobError::Abandoned { .. })
    }

    /// Borrows the handler's own error, if that is what this is.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            JobError::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Why a job context is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// Cancelled explicitly (shutdown, or the cell returned).
    #[error("context canceled")]
    Canceled,
    /// The deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}
