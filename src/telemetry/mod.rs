//! Live node metrics.
//!
//! - [`TelemetrySnapshot`], [`NetworkMetrics`] normalized display form
//! - [`TelemetryState`] standing `NodeStats` subscriber that owns the snapshot

mod snapshot;
mod state;

pub use snapshot::{NetworkMetrics, TelemetrySnapshot};
pub use state::TelemetryState;
