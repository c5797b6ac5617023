//! Worker contract expected by the host queue framework.
//!
//! The framework drives a worker only through these operations; [`Worker`]
//! implements them by delegating to its inherent methods of the same names.

use async_trait::async_trait;

use crate::core::Worker;
use crate::error::{JobError, WorkerError};
use crate::jobs::Job;

/// Queue worker contract.
///
/// Every method may be called from any number of tasks at once.
#[async_trait]
pub trait QueueWorker: Send + Sync {
    /// Hook run before the framework starts consuming. No-op for this worker.
    fn before_run(&self) -> Result<(), WorkerError>;

    /// Hook run after the framework stopped consuming. No-op for this worker.
    fn after_run(&self) -> Result<(), WorkerError>;

    /// Gate for new work: `Err(Shutdown)` once the worker is stopped.
    fn submit(&self, job: &Job) -> Result<(), WorkerError>;

    /// `Err(Shutdown)` once the stop signal is closed.
    fn run_state(&self) -> Result<(), WorkerError>;

    /// Maximum concurrent jobs; `0` means unbounded.
    fn capacity(&self) -> usize;

    /// Jobs currently running; `0` means not tracked.
    fn usage(&self) -> usize;

    /// Runs one job to its single outcome.
    async fn execute(&self, job: Job) -> Result<(), JobError>;

    /// Stops the worker. Succeeds exactly once.
    async fn shutdown(&self) -> Result<(), WorkerError>;
}

#[async_trait]
impl QueueWorker for Worker {
    fn before_run(&self) -> Result<(), WorkerError> {
        Worker::before_run(self)
    }

    fn after_run(&self) -> Result<(), WorkerError> {
        Worker::after_run(self)
    }

    fn submit(&self, job: &Job) -> Result<(), WorkerError> {
        Worker::submit(self, job)
    }

    fn run_state(&self) -> Result<(), WorkerError> {
        Worker::run_state(self)
    }

    fn capacity(&self) -> usize {
        Worker::capacity(self)
    }

    fn usage(&self) -> usize {
        Worker::usage(self)
    }

    async fn execute(&self, job: Job) -> Result<(), JobError> {
        Worker::execute(self, job).await
    }

    async fn shutdown(&self) -> Result<(), WorkerError> {
        Worker::shutdown(self).await
    }
}
