//! Redis transport client.
//!
//! Opens a [`redis::Client`] from [`WorkerConfig`], verifies it with `PING`,
//! and keeps the multiplexed connection until [`Transport::close`] drops it.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::transport::Transport;

/// Redis-backed transport.
pub struct RedisTransport {
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisTransport {
    /// Connects to the server described by `cfg` and checks it answers `PING`.
    pub async fn connect(cfg: &WorkerConfig) -> Result<Self, WorkerError> {
        let client = redis::Client::open(cfg.connection_info()?)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!(channel = %cfg.channel, reply = %pong, "redis transport connected");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Sends `PING` over the live connection.
    ///
    /// Returns [`WorkerError::Shutdown`] once the transport is closed.
    pub async fn ping(&self) -> Result<(), WorkerError> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or(WorkerError::Shutdown)?;
        let _: String = redis::cmd("PING").query_async(conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for RedisTransport {
    async fn close(&self) -> Result<(), WorkerError> {
        // Dropping the last handle closes the socket.
        self.conn.lock().await.take();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
