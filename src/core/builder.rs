use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::worker::Worker;
use crate::{
    config::WorkerConfig,
    error::{HandlerError, WorkerError},
    events::Bus,
    jobs::{self, HandlerFn, HandlerRef, Job, JobContext},
    subscribers::{Subscribe, SubscriberSet},
    transport::{RedisTransport, Transport},
};

/// Builder for constructing a [`Worker`], one setter per recognized option.
///
/// ## Example
/// ```rust,no_run
/// use std::time::Duration;
/// use redisvisor::{HandlerError, Job, JobContext, WorkerBuilder, WorkerConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let worker = WorkerBuilder::new(WorkerConfig::default())
///     .with_addr("127.0.0.1:6379")
///     .with_channel("emails")
///     .with_handler_fn("send", |_ctx: JobContext, job: Job| async move {
///         println!("{}", String::from_utf8_lossy(job.bytes()));
///         Ok::<(), HandlerError>(())
///     })
///     .connect()
///     .await?;
///
/// worker.execute(Job::new("hello", Duration::from_secs(5))).await?;
/// worker.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkerBuilder {
    cfg: WorkerConfig,
    handler: Option<HandlerRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    transport: Option<Arc<dyn Transport>>,
}

impl WorkerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: WorkerConfig) -> Self {
        Self {
            cfg,
            handler: None,
            subscribers: Vec::new(),
            transport: None,
        }
    }

    /// Redis `host:port`.
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.cfg.addr = addr.into();
        self
    }

    /// Redis database index.
    pub fn with_db(mut self, db: i64) -> Self {
        self.cfg.db = db;
        self
    }

    /// Redis password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.cfg.password = Some(password.into());
        self
    }

    /// Full Redis URL; overrides addr, db and password.
    pub fn with_connection_string(mut self, url: impl Into<String>) -> Self {
        self.cfg.connection_string = Some(url.into());
        self
    }

    /// Channel name.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.cfg.channel = channel.into();
        self
    }

    /// Channel buffer size hint.
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.cfg.channel_size = size;
        self
    }

    /// Handler run for every job. Defaults to one that accepts everything.
    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Shorthand for `with_handler(HandlerFn::arc(name, f))`.
    pub fn with_handler_fn<F, Fut>(self, name: &'static str, f: F) -> Self
    where
        F: Fn(JobContext, Job) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.with_handler(HandlerFn::arc(name, f))
    }

    /// Sets event subscribers (the worker's logger).
    ///
    /// Subscribers receive worker events through dedicated tasks with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Uses `transport` instead of connecting to Redis.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Connects the Redis transport (unless one was injected) and builds the worker.
    ///
    /// Fails on an unparsable connection string or when the server does not answer `PING`.
    pub async fn connect(mut self) -> Result<Arc<Worker>, WorkerError> {
        if self.transport.is_none() {
            let redis = RedisTransport::connect(&self.cfg).await.inspect_err(|e| {
                tracing::error!(channel = %self.cfg.channel, error = %e, "redis connect failed");
            })?;
            self.transport = Some(Arc::new(redis));
        }
        self.build()
    }

    /// Builds the worker around an injected transport.
    ///
    /// Must be called inside a tokio runtime: subscriber workers are spawned here.
    pub fn build(self) -> Result<Arc<Worker>, WorkerError> {
        let transport = self.transport.ok_or_else(|| WorkerError::InvalidConfig {
            reason: "no transport; use connect() or with_transport()".to_string(),
        })?;
        let handler = self.handler.unwrap_or_else(jobs::noop);

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, subs, listener.clone());
        }

        Ok(Arc::new(Worker::new_internal(
            self.cfg, handler, transport, bus, listener,
        )))
    }
}

/// Forwards bus events to the subscriber set until the worker is dropped.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => break,
            }
        }
        subs.shutdown().await;
    });
}
