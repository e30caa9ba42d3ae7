//! # Telemetry state: the live metrics snapshot.
//!
//! [`TelemetryState`] subscribes to `NodeStats` notifications and replaces its snapshot
//! wholesale on every event (overwrite, never merge). The payload is not validated;
//! whatever the bridge reports is what the snapshot shows.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::snapshot::TelemetrySnapshot;
use crate::bridge::StatsPayload;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, Subscription};

/// Owner of the most recent [`TelemetrySnapshot`].
pub struct TelemetryState {
    snapshot: watch::Sender<TelemetrySnapshot>,
}

impl TelemetryState {
    /// Creates the state with an all-zero snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (snapshot, _rx) = watch::channel(TelemetrySnapshot::default());
        Self { snapshot }
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<TelemetrySnapshot> {
        self.snapshot.subscribe()
    }

    /// Replaces the snapshot with the translation of `payload`.
    pub fn apply(&self, payload: &StatsPayload) {
        self.snapshot.send_replace(TelemetrySnapshot::from(payload));
    }

    /// Starts the standing `NodeStats` subscription on `bus`.
    pub fn watch(self: &Arc<Self>, bus: &Bus) -> Subscription {
        Subscription::spawn(bus, Arc::clone(self) as Arc<dyn Subscribe>)
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for TelemetryState {
    async fn on_event(&self, ev: &Event) {
        if ev.kind != EventKind::NodeStats {
            return;
        }
        match ev.stats.as_deref() {
            Some(payload) => self.apply(payload),
            None => tracing::debug!(seq = ev.seq, "stats event without payload ignored"),
        }
    }

    fn name(&self) -> &'static str {
        "telemetry"
    }
}
