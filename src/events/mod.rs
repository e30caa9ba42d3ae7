//! Bridge notifications: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] notification classification and payload
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: a [`ProcessBridge`](crate::ProcessBridge) implementation.
//! - **Consumers**: standing [`Subscription`](crate::Subscription)s owned by the
//!   supervisor, the telemetry state and the optional log writer.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
