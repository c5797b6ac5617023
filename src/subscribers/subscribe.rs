//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging event handlers (the worker's
//! "logger") into a worker. Each subscriber is driven by a dedicated worker loop
//! fed by a bounded queue owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they do **not** block execution cells.
//! - If a subscriber's queue overflows, events for that subscriber are **dropped**.
//!
//! ## Example
//! ```rust
//! use redisvisor::{Event, EventKind, Subscribe};
//!
//! struct Abandoned;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Abandoned {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::JobAbandoned {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "abandoned" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
