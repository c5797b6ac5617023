//! # Worker: lifecycle gate in front of the execution cells.
//!
//! The [`Worker`] owns the handler, the transport client, the event bus and the
//! shutdown coordinator. The host queue framework talks to it through
//! [`QueueWorker`](crate::QueueWorker) (or the inherent methods of the same names).
//!
//! ## Operations
//! ```text
//! submit(&job)   ── stopped? ──► Err(Shutdown)           (no cell spawned)
//!                └─ zero timeout ──► Err(ZeroTimeout)
//!                └─ otherwise ──► Ok(())                  (publishing is the transport's job)
//!
//! run_state()    ── stop signal closed? ──► Err(Shutdown) else Ok(())
//!
//! execute(job)   ──► core::cell::execute (deadline, shutdown race, panic re-raise)
//!
//! shutdown()     ──► Coordinator: first call Ok + teardown once, later calls Err(Shutdown)
//!
//! capacity() = 0, usage() = 0   (unbounded / unspecified)
//! ```
//!
//! All of these take `&self` and are safe to call from any number of tasks at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    config::WorkerConfig,
    core::{
        cell::{self, Probe},
        shutdown::Coordinator,
    },
    error::{JobError, WorkerError},
    events::{Bus, Event, EventKind},
    jobs::{HandlerRef, Job},
    transport::Transport,
};

/// Redis-backed queue worker.
pub struct Worker {
    cfg: WorkerConfig,
    channel: Arc<str>,
    handler: HandlerRef,
    transport: Arc<dyn Transport>,
    coordinator: Coordinator,
    bus: Bus,
    jobs: AtomicU64,
    /// Stops the subscriber listener when the worker is dropped.
    listener: CancellationToken,
}

impl Worker {
    pub(crate) fn new_internal(
        cfg: WorkerConfig,
        handler: HandlerRef,
        transport: Arc<dyn Transport>,
        bus: Bus,
        listener: CancellationToken,
    ) -> Self {
        let channel: Arc<str> = Arc::from(cfg.channel.as_str());
        Self {
            cfg,
            channel,
            handler,
            transport,
            coordinator: Coordinator::new(),
            bus,
            jobs: AtomicU64::new(0),
            listener,
        }
    }

    /// Hook run by the host framework before its worker loop starts. No-op.
    pub fn before_run(&self) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Hook run by the host framework after its worker loop stops. No-op.
    pub fn after_run(&self) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Accepts or rejects a job submission.
    ///
    /// Rejects with [`WorkerError::Shutdown`] once stopped and with
    /// [`WorkerError::ZeroTimeout`] for a job without a deadline. Acceptance
    /// does not run the job.
    pub fn submit(&self, job: &Job) -> Result<(), WorkerError> {
        let rejected = if self.coordinator.is_stopped() {
            WorkerError::Shutdown
        } else if !job.has_timeout() {
            WorkerError::ZeroTimeout
        } else {
            return Ok(());
        };

        self.publish(Event::new(EventKind::SubmitRejected).with_reason(rejected.as_label()));
        Err(rejected)
    }

    /// Non-blocking run-state check: `Err(Shutdown)` once the stop signal is closed.
    pub fn run_state(&self) -> Result<(), WorkerError> {
        if self.coordinator.is_signalled() {
            return Err(WorkerError::Shutdown);
        }
        Ok(())
    }

    /// Always `0`: unbounded / unspecified.
    pub fn capacity(&self) -> usize {
        0
    }

    /// Always `0`.
    pub fn usage(&self) -> usize {
        0
    }

    /// Runs one job in its own execution cell and returns its outcome.
    ///
    /// # Panics
    /// Re-raises a panic of the handler, with the handler's own payload.
    pub async fn execute(&self, job: Job) -> Result<(), JobError> {
        let probe = Probe {
            bus: &self.bus,
            channel: &self.channel,
            job: self.jobs.fetch_add(1, Ordering::Relaxed) + 1,
        };
        cell::execute(&self.handler, job, self.coordinator.signal(), probe).await
    }

    /// Shuts the worker down.
    ///
    /// The first call closes the stop signal (releasing every in-flight cell
    /// into its grace window), closes the transport and returns `Ok(())`.
    /// Every later call returns [`WorkerError::Shutdown`].
    ///
    /// The transport is closed even if this future is dropped before it completes.
    pub async fn shutdown(&self) -> Result<(), WorkerError> {
        let bus = self.bus.clone();
        let channel = Arc::clone(&self.channel);
        let transport = Arc::clone(&self.transport);

        self.coordinator
            .shutdown(move || async move {
                let requested = Event::new(EventKind::ShutdownRequested);
                bus.publish(requested.with_channel(Arc::clone(&channel)));
                let closed = match transport.close().await {
                    Ok(()) => Event::new(EventKind::TransportClosed),
                    Err(e) => {
                        tracing::warn!(
                            channel = %channel,
                            transport = transport.name(),
                            error = %e,
                            "transport close failed"
                        );
                        Event::new(EventKind::TransportClosed).with_reason(e.to_string())
                    }
                };
                bus.publish(closed.with_channel(channel));
            })
            .await
    }

    /// `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_stopped(&self) -> bool {
        self.coordinator.is_stopped()
    }

    /// Configuration the worker was built with.
    pub fn config(&self) -> &WorkerConfig {
        &self.cfg
    }

    /// Channel name.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Receiver for this worker's events (sent after the call).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_channel(Arc::clone(&self.channel)));
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::WorkerBuilder;
    use crate::error::HandlerError;
    use crate::jobs::{HandlerFn, JobContext};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::time::{self, Instant};

    #[derive(Default)]
    struct CountingTransport {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn close(&self) -> Result<(), WorkerError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn worker_with(handler: HandlerRef) -> (Arc<Worker>, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport::default());
        let worker = WorkerBuilder::new(WorkerConfig::default())
            .with_handler(handler)
            .with_transport(transport.clone())
            .build()
            .unwrap();
        (worker, transport)
    }

    fn noop_worker() -> (Arc<Worker>, Arc<CountingTransport>) {
        worker_with(crate::jobs::noop())
    }

    /// Loops every 50ms until its context is done.
    fn cooperative() -> HandlerRef {
        HandlerFn::arc("cooperative", |ctx: JobContext, _job: Job| async move {
            loop {
                if ctx.is_cancelled() {
                    return Ok::<(), HandlerError>(());
                }
                time::sleep(Duration::from_millis(50)).await;
            }
        })
    }

    fn stubborn() -> HandlerRef {
        HandlerFn::arc("stubborn", |_ctx: JobContext, _job: Job| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<(), HandlerError>(())
        })
    }

    #[tokio::test]
    async fn contract_constants_and_hooks() {
        let (w, _) = noop_worker();
        assert_eq!(w.capacity(), 0);
        assert_eq!(w.usage(), 0);
        assert!(w.before_run().is_ok());
        assert!(w.after_run().is_ok());
        assert!(w.run_state().is_ok());
        assert_eq!(w.channel(), "queue");
    }

    #[tokio::test]
    async fn shutdown_twice_closes_transport_once() {
        let (w, transport) = noop_worker();

        assert!(w.shutdown().await.is_ok());
        let second = w.shutdown().await;

        assert!(matches!(second, Err(WorkerError::Shutdown)));
        assert_eq!(transport.closes.load(Ordering::SeqCst), 1);
        assert!(w.is_stopped());
        assert!(matches!(w.run_state(), Err(WorkerError::Shutdown)));
    }

    struct SlowTransport {
        closes: AtomicUsize,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn close(&self) -> Result<(), WorkerError> {
            time::sleep(Duration::from_millis(100)).await;
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transport_closes_even_if_first_shutdown_is_dropped() {
        let transport = Arc::new(SlowTransport {
            closes: AtomicUsize::new(0),
        });
        let w = WorkerBuilder::new(WorkerConfig::default())
            .with_transport(transport.clone())
            .build()
            .unwrap();

        let first = time::timeout(Duration::from_millis(10), w.shutdown()).await;
        assert!(first.is_err());
        assert!(matches!(w.shutdown().await, Err(WorkerError::Shutdown)));
        assert!(matches!(w.run_state(), Err(WorkerError::Shutdown)));

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_rejected_without_side_effects() {
        let (w, _) = noop_worker();
        let job = Job::new("foo", Duration::from_secs(1));
        assert!(w.submit(&job).is_ok());

        w.shutdown().await.unwrap();
        let mut events = w.subscribe();
        let err = w.submit(&job).unwrap_err();

        assert!(err.is_shutdown());
        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubmitRejected);
        assert!(events.try_recv().is_err(), "no cell may start");
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected_at_both_doors() {
        let (w, _) = noop_worker();
        let job = Job::new("foo", Duration::ZERO);

        assert!(matches!(w.submit(&job), Err(WorkerError::ZeroTimeout)));
        assert!(matches!(w.execute(job).await, Err(JobError::ZeroTimeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn job_reaches_timeout() {
        let (w, _) = worker_with(cooperative());
        let started = Instant::now();

        let err = w
            .execute(Job::new("foo", Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::DeadlineExceeded { .. }));
        assert!(started.elapsed() < Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_job_after_shutdown() {
        let (w, _) = worker_with(cooperative());
        let started = Instant::now();

        let run = tokio::spawn({
            let w = Arc::clone(&w);
            async move { w.execute(Job::new("test", Duration::from_secs(3))).await }
        });
        time::sleep(Duration::from_millis(50)).await;
        w.shutdown().await.unwrap();

        assert!(run.await.unwrap().is_ok());
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_job_is_abandoned_at_original_deadline() {
        let (w, _) = worker_with(stubborn());
        let mut events = w.subscribe();
        let started = Instant::now();

        let run = tokio::spawn({
            let w = Arc::clone(&w);
            async move { w.execute(Job::new("test", Duration::from_secs(3))).await }
        });
        time::sleep(Duration::from_millis(50)).await;
        w.shutdown().await.unwrap();

        let err = run.await.unwrap().unwrap_err();
        assert!(err.is_abandoned());
        assert!(err.is_deadline_exceeded());
        let took = started.elapsed();
        assert!(took >= Duration::from_secs(3) && took < Duration::from_millis(3050));

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds.first(), Some(&EventKind::JobStarting));
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert_eq!(kinds.iter().filter(|k| k.is_terminal()).count(), 1);
        assert_eq!(kinds.last(), Some(&EventKind::JobAbandoned));
    }

    #[tokio::test]
    async fn handler_error_comes_back_verbatim() {
        #[derive(Debug)]
        struct BadPayload;
        impl std::fmt::Display for BadPayload {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("bad payload")
            }
        }
        impl std::error::Error for BadPayload {}

        let h: HandlerRef = HandlerFn::arc("fails", |_ctx: JobContext, _job: Job| async {
            Err::<(), HandlerError>(Box::new(BadPayload))
        });
        let (w, _) = worker_with(h);

        let err = w.execute(Job::new("x", Duration::from_secs(1))).await.unwrap_err();

        let inner = err.handler_error().unwrap();
        assert!(inner.downcast_ref::<BadPayload>().is_some());
    }

    #[tokio::test]
    async fn panic_reaches_the_caller_with_its_payload() {
        let h: HandlerRef = HandlerFn::arc("panics", |_ctx: JobContext, _job: Job| async {
            if true {
                panic!("missing something");
            }
            Ok::<(), HandlerError>(())
        });
        let (w, _) = worker_with(h);

        let caller = tokio::spawn({
            let w = Arc::clone(&w);
            async move { w.execute(Job::new("foo", Duration::from_secs(1))).await }
        });
        let err = caller.await.unwrap_err();

        assert!(err.is_panic());
        let payload = err.into_panic();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"missing something"));

        // The worker itself is unaffected.
        assert!(w.run_state().is_ok());
        assert!(w.submit(&Job::new("bar", Duration::from_secs(1))).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn panic_after_shutdown_still_reaches_the_caller() {
        let h: HandlerRef = HandlerFn::arc("late-panic", |ctx: JobContext, _job: Job| async move {
            ctx.cancelled().await;
            if true {
                panic!("late boom");
            }
            Ok::<(), HandlerError>(())
        });
        let (w, _) = worker_with(h);

        let caller = tokio::spawn({
            let w = Arc::clone(&w);
            async move { w.execute(Job::new("test", Duration::from_secs(3))).await }
        });
        time::sleep(Duration::from_millis(50)).await;
        w.shutdown().await.unwrap();

        let err = caller.await.unwrap_err();
        assert!(err.is_panic());
        assert_eq!(err.into_panic().downcast_ref::<&str>(), Some(&"late boom"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_jobs_run_concurrently() {
        let done = Arc::new(AtomicUsize::new(0));
        let h: HandlerRef = HandlerFn::arc("count", {
            let done = Arc::clone(&done);
            move |_ctx: JobContext, _job: Job| {
                let done = Arc::clone(&done);
                async move {
                    time::sleep(Duration::from_millis(50)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            }
        });
        let (w, _) = worker_with(h);

        let mut runs = Vec::new();
        for i in 0..50 {
            let w = Arc::clone(&w);
            runs.push(tokio::spawn(async move {
                let job = Job::new(format!("foobar: {}", i + 1), Duration::from_secs(5));
                w.submit(&job).is_ok() && w.execute(job).await.is_ok()
            }));
        }
        for r in runs {
            assert!(r.await.unwrap());
        }
        assert_eq!(done.load(Ordering::SeqCst), 50);
    }
}
