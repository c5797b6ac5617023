//! # Execution cell: run one job under its deadline, raced against shutdown.
//!
//! ## Flow
//! ```text
//! execute(job)
//!   ├─► ctx = JobContext(now + job.timeout)       (cancelled when the cell returns)
//!   ├─► tokio::spawn(handler.handle(ctx, job))    (panic isolated by the task boundary)
//!   └─► select! (biased)
//!         ├─ stop signal ─► ctx.cancel(Canceled)
//!         │                 budget = timeout - elapsed
//!         │                 select! (biased)
//!         │                   ├─ handler done/panicked ─► that outcome
//!         │                   └─ budget elapsed        ─► Abandoned
//!         ├─ handler done/panicked ─► Success / Failed / Panicked
//!         └─ deadline ─► ctx.cancel(DeadlineExceeded) ─► TimedOut
//! ```
//!
//! ## Rules
//! - Exactly **one** outcome and one terminal event per job
//! - Total lifetime never exceeds the declared timeout, shutdown or not
//! - Shutdown wins over a simultaneously finished handler, whose result is
//!   then still collected inside the grace window
//! - A panic is published as `JobPanicked` and re-raised in the caller after
//!   the context is cancelled
//! - On `TimedOut`/`Abandoned` the handler task is detached, not aborted:
//!   cancellation is cooperative and a handler that ignores it keeps running

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ContextError, HandlerError, JobError},
    events::{Bus, Event, EventKind},
    jobs::{HandlerRef, Job, JobContext},
    subscribers::panic_message,
};

/// How one cell resolved.
pub(crate) enum Outcome {
    Success,
    Failed(HandlerError),
    TimedOut,
    Abandoned,
    Panicked(Box<dyn Any + Send + 'static>),
}

/// Where a cell reports its events.
pub(crate) struct Probe<'a> {
    pub bus: &'a Bus,
    pub channel: &'a Arc<str>,
    pub job: u64,
}

/// Runs `job` to a single outcome and reports it.
///
/// Returns `Ok(())` on success, the handler's error verbatim, or a deadline
/// error. A handler panic resumes unwinding in the caller.
pub(crate) async fn execute(
    handler: &HandlerRef,
    job: Job,
    stop: &CancellationToken,
    probe: Probe<'_>,
) -> Result<(), JobError> {
    let timeout = job.timeout();
    if timeout.is_zero() {
        return Err(JobError::ZeroTimeout);
    }

    publish(&probe, Event::new(EventKind::JobStarting).with_timeout(timeout));
    let started = Instant::now();
    let outcome = run_cell(Arc::clone(handler), job, stop).await;
    let elapsed = started.elapsed();

    match outcome {
        Outcome::Success => {
            publish(&probe, Event::new(EventKind::JobSucceeded).with_elapsed(elapsed));
            Ok(())
        }
        Outcome::Failed(err) => {
            publish(
                &probe,
                Event::new(EventKind::JobFailed)
                    .with_elapsed(elapsed)
                    .with_reason(err.to_string()),
            );
            Err(JobError::Handler(err))
        }
        Outcome::TimedOut => {
            publish(
                &probe,
                Event::new(EventKind::TimeoutHit)
                    .with_timeout(timeout)
                    .with_elapsed(elapsed),
            );
            Err(JobError::DeadlineExceeded { timeout })
        }
        Outcome::Abandoned => {
            publish(
                &probe,
                Event::new(EventKind::JobAbandoned)
                    .with_timeout(timeout)
                    .with_elapsed(elapsed),
            );
            Err(JobError::Abandoned { timeout, elapsed })
        }
        Outcome::Panicked(payload) => {
            publish(
                &probe,
                Event::new(EventKind::JobPanicked)
                    .with_elapsed(elapsed)
                    .with_reason(panic_message(&*payload)),
            );
            std::panic::resume_unwind(payload)
        }
    }
}

/// The race itself. The returned outcome is not yet reported.
pub(crate) async fn run_cell(handler: HandlerRef, job: Job, stop: &CancellationToken) -> Outcome {
    let timeout = job.timeout();
    let started = Instant::now();
    let ctx = JobContext::with_deadline(started + timeout);
    let _cancel_on_return = ctx.drop_guard();

    let mut join = tokio::spawn({
        let ctx = ctx.clone();
        async move { handler.handle(ctx, job).await }
    });

    tokio::select! {
        biased;

        _ = stop.cancelled() => {
            ctx.cancel_with(ContextError::Canceled);
            let budget = remaining_budget(timeout, started.elapsed());

            tokio::select! {
                biased;
                res = &mut join => collect(res),
                _ = time::sleep(budget) => Outcome::Abandoned,
            }
        }
        res = &mut join => collect(res),
        _ = time::sleep_until(ctx.deadline()) => {
            ctx.cancel_with(ContextError::DeadlineExceeded);
            Outcome::TimedOut
        }
    }
}

/// Time left of the original timeout; never a fresh window.
fn remaining_budget(timeout: Duration, elapsed: Duration) -> Duration {
    timeout.saturating_sub(elapsed)
}

fn collect(res: Result<Result<(), HandlerError>, JoinError>) -> Outcome {
    match res {
        Ok(Ok(())) => Outcome::Success,
        Ok(Err(err)) => Outcome::Failed(err),
        Err(err) if err.is_panic() => Outcome::Panicked(err.into_panic()),
        // Aborted by the runtime going away.
        Err(_) => Outcome::Abandoned,
    }
}

fn publish(probe: &Probe<'_>, ev: Event) {
    probe
        .bus
        .publish(ev.with_channel(Arc::clone(probe.channel)).with_job(probe.job));
}
