//! # Notifications emitted by the process bridge.
//!
//! The [`EventKind`] enum classifies the two asynchronous notifications a bridge can emit:
//! - **NodeCrashed**: the node process terminated without being asked to
//! - **NodeStats**: a periodic telemetry sample
//!
//! The [`Event`] struct carries metadata such as the timestamp, a reason and the stats payload.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! There is no ordering guarantee relative to in-flight launch/shutdown requests.
//!
//! ## Example
//! ```rust
//! use trinvisor::{Event, EventKind};
//!
//! let ev = Event::crashed().with_reason("exit status: 101");
//!
//! assert_eq!(ev.kind, EventKind::NodeCrashed);
//! assert_eq!(ev.reason.as_deref(), Some("exit status: 101"));
//! assert!(ev.stats.is_none());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::bridge::StatsPayload;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of bridge notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Node process terminated unexpectedly.
    ///
    /// Sets:
    /// - `reason`: exit status or failure text, when known
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    NodeCrashed,

    /// Periodic telemetry sample.
    ///
    /// Sets:
    /// - `stats`: the wire payload
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    NodeStats,
}

/// Bridge notification with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Human-readable reason (crash details).
    pub reason: Option<Arc<str>>,
    /// Telemetry payload (only for [`EventKind::NodeStats`]).
    pub stats: Option<Arc<StatsPayload>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reason: None,
            stats: None,
        }
    }

    /// Creates a crash notification.
    #[inline]
    pub fn crashed() -> Self {
        Event::new(EventKind::NodeCrashed)
    }

    /// Creates a stats notification carrying `payload`.
    #[inline]
    pub fn stats(payload: impl Into<Arc<StatsPayload>>) -> Self {
        let mut ev = Event::new(EventKind::NodeStats);
        ev.stats = Some(payload.into());
        ev
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn is_crash(&self) -> bool {
        matches!(self.kind, EventKind::NodeCrashed)
    }

    #[inline]
    pub fn is_stats(&self) -> bool {
        matches!(self.kind, EventKind::NodeStats)
    }
}
