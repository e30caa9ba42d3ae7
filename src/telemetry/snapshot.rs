//! # Normalized telemetry snapshot.
//!
//! [`TelemetrySnapshot`] is what the presentation layer renders. It is derived from a
//! [`StatsPayload`] of any generation by a mechanical mapping:
//!
//! ```text
//! payload.cpu / pid                 → cpu / pid
//! stateData.disk_usage              → disk_usage_mb   (flat: diskUsage)
//! stateData   | historyData | beaconData
//!   radius, content_current, ... → NetworkMetrics { radius, content_current, ... }
//! latestFinalizedBlock / latestOptimisticBlock → Option<u64>
//! ```
//!
//! Networks a generation does not report are all-zero; absent chain-sync heads are `None`.

use serde::Serialize;

use crate::bridge::{StatsPayload, SubnetworkData};

/// Metrics of one content network, in display form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub radius: f64,
    pub content_current: f64,
    pub content_total: f64,
    pub count: u64,
    pub offers_in: u64,
    pub offers_out: u64,
    pub accepts_in: u64,
    pub accepts_out: u64,
    pub validations_in: u64,
    pub validations_out: u64,
}

impl From<&SubnetworkData> for NetworkMetrics {
    fn from(d: &SubnetworkData) -> Self {
        Self {
            radius: d.radius,
            content_current: d.content_current,
            content_total: d.content_total,
            count: d.count,
            offers_in: d.offers_in,
            offers_out: d.offers_out,
            accepts_in: d.accepts_in,
            accepts_out: d.accepts_out,
            validations_in: d.validations_in,
            validations_out: d.validations_out,
        }
    }
}

/// Most recent node metrics. Only one snapshot exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub cpu: f32,
    pub pid: u32,
    #[serde(rename = "diskUsageMB")]
    pub disk_usage_mb: f64,
    pub latest_finalized_block: Option<u64>,
    pub latest_optimistic_block: Option<u64>,
    pub state: NetworkMetrics,
    pub history: NetworkMetrics,
    pub beacon: NetworkMetrics,
}

impl From<&StatsPayload> for TelemetrySnapshot {
    fn from(payload: &StatsPayload) -> Self {
        match payload {
            StatsPayload::Tri(p) => Self {
                cpu: p.cpu,
                pid: p.pid,
                disk_usage_mb: p.state_data.disk_usage,
                latest_finalized_block: p.latest_finalized_block,
                latest_optimistic_block: p.latest_optimistic_block,
                state: (&p.state_data).into(),
                history: (&p.history_data).into(),
                beacon: (&p.beacon_data).into(),
            },
            StatsPayload::Dual(p) => Self {
                cpu: p.cpu,
                pid: p.pid,
                disk_usage_mb: p.state_data.disk_usage,
                state: (&p.state_data).into(),
                history: (&p.history_data).into(),
                ..Self::default()
            },
            StatsPayload::Flat(p) => Self {
                cpu: p.cpu,
                pid: p.pid,
                disk_usage_mb: p.disk_usage,
                history: (&p.network()).into(),
                ..Self::default()
            },
        }
    }
}
