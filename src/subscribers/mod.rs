//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`Subscription`] lifecycle handle and
//! built-in implementations for handling notifications broadcast through the
//! [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   bridge ── publish(Event) ──► Bus ──► one receiver per Subscription
//!                                              │
//!                                              ├──► CrashRecovery   (restarts the node)
//!                                              ├──► TelemetryState  (replaces the snapshot)
//!                                              └──► LogWriter       (tracing output)
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscription;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscription::Subscription;
