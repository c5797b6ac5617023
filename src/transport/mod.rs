//! # Transport boundary.
//!
//! The worker's only requirement on its transport client is a teardown hook
//! that the shutdown coordinator invokes exactly once. Publishing and
//! consuming are the host queue framework's business and are not modelled.
//!
//! - [`Transport`] the teardown contract
//! - [`RedisTransport`] the Redis client used by [`WorkerBuilder::connect`](crate::WorkerBuilder::connect)

mod redis;

use async_trait::async_trait;

use crate::error::WorkerError;

pub use self::redis::RedisTransport;

/// Transport client held by a worker.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Releases the client. Called at most once per worker.
    async fn close(&self) -> Result<(), WorkerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
