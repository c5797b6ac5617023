//! # Demo: redis_worker
//!
//! A worker bound to a local Redis, running a batch of JSON jobs and then
//! shutting down while one stubborn job is still in flight.
//!
//! Demonstrates how to:
//! - Connect a [`RedisTransport`], check it with `PING` and hand it to [`WorkerBuilder`].
//! - Decode job payloads inside a cancel-aware handler.
//! - Watch the outcomes through the tracing-backed [`LogWriter`].
//!
//! ## Flow
//! ```text
//! RedisTransport::connect() ──► PING, ping()
//! execute(job) x N (concurrently)
//!     ├─► JobStarting
//!     └─► JobSucceeded | TimeoutHit | JobFailed
//! shutdown()
//!     ├─► ShutdownRequested
//!     ├─► in-flight "sleep" job ─► JobAbandoned at its original deadline
//!     └─► TransportClosed
//! ```
//!
//! ## Run
//! ```bash
//! docker run --rm -p 6379:6379 redis:7
//! RUST_LOG=info cargo run --example redis_worker
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use redisvisor::{
    HandlerError, Job, JobContext, LogWriter, RedisTransport, Subscribe, WorkerBuilder,
    WorkerConfig,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Serialize, Deserialize)]
struct Task {
    kind: String,
    ms: u64,
}

async fn handle(ctx: JobContext, job: Job) -> Result<(), HandlerError> {
    let task: Task = job.decode()?;
    match task.kind.as_str() {
        "work" => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(task.ms)) => Ok(()),
                _ = ctx.cancelled() => Err(format!("interrupted: {:?}", ctx.err()).into()),
            }
        }
        // Ignores its context on purpose.
        "sleep" => {
            tokio::time::sleep(Duration::from_millis(task.ms)).await;
            Ok(())
        }
        other => Err(format!("unknown task kind {other:?}").into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Route tracing output to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 2. Log every worker event
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    // 3. Connect and health-check the transport
    let cfg = WorkerConfig::default();
    let redis = Arc::new(
        RedisTransport::connect(&cfg)
            .await
            .context("is redis running on 127.0.0.1:6379?")?,
    );
    redis.ping().await?;

    let worker = WorkerBuilder::new(cfg)
        .with_channel("demo")
        .with_subscribers(subs)
        .with_handler_fn("demo", handle)
        .with_transport(redis.clone())
        .build()?;

    // 4. A batch: fast, too slow, unknown
    let batch = [
        (
            Task {
                kind: "work".into(),
                ms: 50,
            },
            Duration::from_secs(1),
        ),
        (
            Task {
                kind: "work".into(),
                ms: 500,
            },
            Duration::from_millis(100),
        ),
        (
            Task {
                kind: "nope".into(),
                ms: 0,
            },
            Duration::from_secs(1),
        ),
    ];
    let mut runs = Vec::new();
    for (task, timeout) in batch {
        let job = Job::json(&task, timeout)?;
        worker.submit(&job)?;
        let w = Arc::clone(&worker);
        runs.push(tokio::spawn(async move { w.execute(job).await }));
    }
    for run in runs {
        if let Err(e) = run.await? {
            println!("job error: {e}");
        }
    }

    // 5. Shut down with a stubborn job in flight
    let stubborn = Job::json(
        &Task {
            kind: "sleep".into(),
            ms: 10_000,
        },
        Duration::from_secs(2),
    )?;
    let in_flight = tokio::spawn({
        let w = Arc::clone(&worker);
        async move { w.execute(stubborn).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    worker.shutdown().await?;

    if let Err(e) = in_flight.await? {
        println!("in-flight job: {e}");
    }
    let late = Job::new("x", Duration::from_secs(1));
    println!("submit after shutdown: {:?}", worker.submit(&late));
    println!("ping after shutdown: {:?}", redis.ping().await);

    // Let the logger drain.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
