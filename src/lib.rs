//! # redisvisor
//!
//! **Redisvisor** is the job-execution supervisor of a Redis-backed queue worker.
//!
//! Every job runs in its own task under a hard deadline, raced against a
//! worker-wide shutdown signal. Handler errors come back verbatim, handler
//! panics are captured and re-raised in the caller, and a shutdown never
//! extends a job past its original timeout.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  execute(j1) │   │  execute(j2) │   │  execute(j3) │
//!     │ (framework)  │   │ (framework)  │   │ (framework)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Worker (lifecycle gate)                                          │
//! │  - Coordinator (stop signal + one-shot transport teardown)        │
//! │  - HandlerRef (shared, read-only)                                 │
//! │  - Transport (Redis client)                                       │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ ExecCell #1  │   │ ExecCell #2  │   │ ExecCell #3  │   │
//!     │ (deadline ×  │   │ (deadline ×  │   │ (deadline ×  │   │
//!     │  shutdown)   │   │  shutdown)   │   │  shutdown)   │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ JobStarting      │ JobStarting      │ JobStarting     │ ShutdownRequested
//!      │ JobSucceeded     │ TimeoutHit       │ JobAbandoned    │ TransportClosed
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │               (capacity: WorkerConfig::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter   custom1    customN
//! ```
//!
//! ### One job
//! ```text
//! execute(job)
//!   ├─► deadline = now + job.timeout
//!   ├─► spawn handler(ctx, job)
//!   └─► first of:
//!         ├─ handler done     ─► Ok / handler error / re-raised panic
//!         ├─ deadline         ─► ctx cancelled ─► DeadlineExceeded
//!         └─ shutdown signal  ─► ctx cancelled
//!                                └─► first of:
//!                                      ├─ handler done               ─► its outcome
//!                                      └─ rest of the original timeout ─► Abandoned
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Worker**        | Lifecycle gate, execution cells, one-shot shutdown.          | [`Worker`], [`WorkerBuilder`], [`QueueWorker`] |
//! | **Jobs**          | Payload + timeout, cancel-aware handler contract.            | [`Job`], [`JobContext`], [`Handler`], [`HandlerFn`] |
//! | **Subscriber API**| Hook into job and lifecycle events (logging, metrics).       | [`Subscribe`], [`Event`]                   |
//! | **Transport**     | Redis client torn down exactly once on shutdown.             | [`Transport`], [`RedisTransport`]          |
//! | **Errors**        | Typed errors for the worker and for job outcomes.            | [`WorkerError`], [`JobError`]              |
//! | **Configuration** | Connection and channel options.                              | [`WorkerConfig`]                           |
//!
//! ## Optional features
//! - `logging` (default): exports the tracing-backed [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use redisvisor::{HandlerError, Job, JobContext, WorkerBuilder, WorkerConfig};
//!
//! #[derive(serde::Deserialize)]
//! struct Email {
//!     to: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn redisvisor::Subscribe>> = vec![Arc::new(redisvisor::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn redisvisor::Subscribe>> = Vec::new();
//!
//!     let worker = WorkerBuilder::new(WorkerConfig::default())
//!         .with_channel("emails")
//!         .with_subscribers(subs)
//!         .with_handler_fn("send", |ctx: JobContext, job: Job| async move {
//!             let email: Email = job.decode()?;
//!             if ctx.is_cancelled() {
//!                 return Ok(());
//!             }
//!             println!("sending to {}", email.to);
//!             Ok::<(), HandlerError>(())
//!         })
//!         .connect()
//!         .await?;
//!
//!     let job = Job::json(&serde_json::json!({ "to": "a@b.c" }), Duration::from_secs(5))?;
//!     worker.submit(&job)?;
//!     worker.execute(job).await?;
//!
//!     worker.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod jobs;
mod queue;
mod subscribers;
mod transport;

// ---- Public re-exports ----

pub use config::{DEFAULT_ADDR, DEFAULT_CHANNEL, WorkerConfig};
pub use core::{Worker, WorkerBuilder};
pub use error::{ContextError, HandlerError, JobError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{Handler, HandlerFn, HandlerRef, Job, JobContext};
pub use queue::QueueWorker;
pub use subscribers::{Subscribe, SubscriberSet};
pub use transport::{RedisTransport, Transport};

// Optional: expose the built-in tracing logger subscriber.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
