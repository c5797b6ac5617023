//! # Job abstractions.
//!
//! This module provides the job-related types:
//! - [`Job`] - opaque payload plus declared timeout
//! - [`JobContext`] - cancellable, deadline-bound context passed to handlers
//! - [`Handler`] - trait for implementing job processing
//! - [`HandlerFn`] - function-based handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler>`)

mod context;
mod handler;
mod job;

pub use context::JobContext;
pub(crate) use handler::noop;
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use job::Job;
