//! # Worker configuration.
//!
//! Provides [`WorkerConfig`] the construction-time settings of a worker.
//! None of these carry core logic: they parameterize the Redis transport and
//! the event bus. The recognized options are address, db index, password,
//! connection string, channel name and channel buffer size; the handler and
//! the logger (event subscribers) are set on the
//! [`WorkerBuilder`](crate::WorkerBuilder).
//!
//! ## Precedence
//! - `connection_string` set → it is parsed as a Redis URL and `addr`/`db`/`password` are ignored
//! - otherwise → `redis://{addr}/` with `db` and `password` applied on top
//!
//! ## Sentinel values
//! - `channel_size = 0` → unspecified (recorded only, the core never buffers)
//! - `bus_capacity = 0` → clamped to 1

use redis::{ConnectionInfo, IntoConnectionInfo};

use crate::error::WorkerError;

/// Default Redis address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:6379";
/// Default channel name.
pub const DEFAULT_CHANNEL: &str = "queue";

/// Construction-time configuration for a [`Worker`](crate::Worker).
///
/// ## Field semantics
/// - `addr`: `host:port` of the Redis server
/// - `db`: logical database index
/// - `password`: optional AUTH password
/// - `connection_string`: full Redis URL, takes precedence when set
/// - `channel`: channel the worker is bound to (used in events and logs)
/// - `channel_size`: buffer size hint for the channel
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Redis `host:port`.
    pub addr: String,
    /// Redis database index.
    pub db: i64,
    /// Redis password.
    pub password: Option<String>,
    /// Redis connection URL; overrides `addr`, `db` and `password`.
    pub connection_string: Option<String>,
    /// Channel name.
    pub channel: String,
    /// Channel buffer size hint (`0` = unspecified).
    pub channel_size: usize,
    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,
}

impl WorkerConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the channel buffer size as an `Option`.
    ///
    /// - `None` → unspecified
    /// - `Some(n)` → caller asked for `n`
    #[inline]
    pub fn channel_size_hint(&self) -> Option<usize> {
        match self.channel_size {
            0 => None,
            n => Some(n),
        }
    }

    /// Resolves the options into Redis connection parameters.
    ///
    /// A connection string without a scheme gets `redis://` prepended.
    pub fn connection_info(&self) -> Result<ConnectionInfo, WorkerError> {
        if let Some(url) = self.connection_string.as_deref().filter(|s| !s.is_empty()) {
            return with_scheme(url)
                .into_connection_info()
                .map_err(|e| invalid(format!("connection string {url:?}: {e}")));
        }

        if self.addr.is_empty() {
            return Err(invalid("neither addr nor connection string set".to_string()));
        }

        let mut info = with_scheme(&self.addr)
            .into_connection_info()
            .map_err(|e| invalid(format!("addr {:?}: {e}", self.addr)))?;
        info.redis.db = self.db;
        if let Some(pw) = self.password.as_ref().filter(|p| !p.is_empty()) {
            info.redis.password = Some(pw.clone());
        }
        Ok(info)
    }
}

impl Default for WorkerConfig {
    /// Default configuration:
    ///
    /// - `addr = "127.0.0.1:6379"`
    /// - `db = 0`, no password, no connection string
    /// - `channel = "queue"`, `channel_size = 0`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            db: 0,
            password: None,
            connection_string: None,
            channel: DEFAULT_CHANNEL.to_string(),
            channel_size: 0,
            bus_capacity: 1024,
        }
    }
}

fn with_scheme(s: &str) -> String {
    if s.contains("://") {
        s.to_string()
    } else {
        format!("redis://{s}/")
    }
}

fn invalid(reason: String) -> WorkerError {
    WorkerError::InvalidConfig { reason }
}
