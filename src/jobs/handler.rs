//! # Handler abstraction and function-backed handler.
//!
//! This module defines the [`Handler`] trait (async, cancel-aware) and a convenient function-backed
//! implementation [`HandlerFn`]. The common handle type is [`HandlerRef`], an `Arc<dyn Handler>`
//! shared read-only by every execution cell.
//!
//! A handler receives a [`JobContext`] and should watch it to stop cooperatively. A handler that
//! ignores it is bounded only by the job's deadline and, on shutdown, by the remaining budget.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::jobs::{Job, JobContext};

/// Shared handle to a handler.
pub type HandlerRef = Arc<dyn Handler>;

/// # Job processing capability.
///
/// Supplied once at worker construction and never mutated afterwards.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use redisvisor::{Handler, HandlerError, Job, JobContext};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Handler for Echo {
///     async fn handle(&self, ctx: JobContext, job: Job) -> Result<(), HandlerError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         println!("{}", String::from_utf8_lossy(job.bytes()));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Processes one job.
    async fn handle(&self, ctx: JobContext, job: Job) -> Result<(), HandlerError>;

    /// Human-readable name (for logs/events).
    fn name(&self) -> &str {
        "handler"
    }
}

/// Function-backed handler.
///
/// Wraps a closure that *creates* a new future per job.
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use redisvisor::{HandlerError, HandlerFn, HandlerRef, Job, JobContext};
    ///
    /// let h: HandlerRef = HandlerFn::arc("noop", |_ctx: JobContext, _job: Job| async {
    ///     Ok::<_, HandlerError>(())
    /// });
    /// assert_eq!(h.name(), "noop");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(JobContext, Job) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, ctx: JobContext, job: Job) -> Result<(), HandlerError> {
        (self.f)(ctx, job).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handler used when none is configured: accepts every job.
pub(crate) fn noop() -> HandlerRef {
    HandlerFn::arc("noop", |_ctx: JobContext, _job: Job| async {
        Ok::<(), HandlerError>(())
    })
}
