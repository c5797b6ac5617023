//! # Job: opaque payload plus a declared timeout.
//!
//! A [`Job`] is immutable once built. It is moved into the execution cell that
//! runs it and dropped when that cell resolves.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use redisvisor::Job;
//!
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Email { to: String }
//!
//! let job = Job::json(&Email { to: "ops@example.com".into() }, Duration::from_secs(5)).unwrap();
//! let back: Email = job.decode().unwrap();
//! assert_eq!(back.to, "ops@example.com");
//! assert_eq!(job.timeout(), Duration::from_secs(5));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Unit of work handed to a [`Handler`](crate::Handler).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    payload: Vec<u8>,
    timeout: Duration,
}

impl Job {
    /// Creates a job from raw bytes.
    ///
    /// The timeout is not validated here; a zero timeout is rejected by
    /// [`Worker::submit`](crate::Worker::submit) and
    /// [`Worker::execute`](crate::Worker::execute).
    pub fn new(payload: impl Into<Vec<u8>>, timeout: Duration) -> Self {
        Self {
            payload: payload.into(),
            timeout,
        }
    }

    /// Creates a job whose payload is `value` encoded as JSON.
    pub fn json<T: Serialize + ?Sized>(
        value: &T,
        timeout: Duration,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_vec(value)?, timeout))
    }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Declared timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `true` when the job has a usable deadline.
    pub fn has_timeout(&self) -> bool {
        self.timeout > Duration::ZERO
    }

    /// Decodes the payload as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Consumes the job, returning its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}
