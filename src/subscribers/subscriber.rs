//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for reacting to bridge notifications.
//! A subscriber is attached to a [`Bus`](crate::Bus) through a
//! [`Subscription`](crate::Subscription), which gives it:
//! - **Dedicated worker task** (runs independently of the publisher)
//! - **Own broadcast receiver** (a slow subscriber only lags itself)
//! - **Panic isolation** (a panicking handler is logged; the worker keeps going)
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use trinvisor::{Event, EventKind, Subscribe};
//!
//! struct CrashCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for CrashCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::NodeCrashed) {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "crash-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Handler for bridge notifications.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Events are delivered one at a time, in publish order, per subscription.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscription worker, not in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
