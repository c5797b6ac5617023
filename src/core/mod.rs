//! Runtime core: execution cells and the worker lifecycle.
//!
//! The public API from this module is [`Worker`] and its [`WorkerBuilder`].
//!
//! Internal modules:
//! - [`cell`]: runs one job under its deadline, raced against shutdown, and publishes the outcome;
//! - [`shutdown`]: one-shot stop signal and transport teardown;
//! - [`worker`]: lifecycle gate (submit, run state, shutdown) around the cells;
//! - [`builder`]: option setters, transport connection, subscriber wiring.

mod builder;
mod cell;
mod shutdown;
mod worker;

pub use builder::WorkerBuilder;
pub use worker::Worker;
