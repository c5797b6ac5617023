//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! fans worker events out to every subscriber. Subscribers are the worker's
//! logger: pass them to [`WorkerBuilder::with_subscribers`](crate::WorkerBuilder::with_subscribers).
//!
//! ```text
//!   cell ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                       ├──► LogWriter (tracing)
//!                                                       └──► custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscriber_set::panic_message;
pub use subscriber_set::SubscriberSet;
