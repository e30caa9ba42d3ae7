//! # Wire payload of the `stats` notification.
//!
//! The payload evolved through three generations:
//!
//! ```text
//! Flat  { cpu, pid?, radius, contentCurrent, ..., diskUsage }          one network (history)
//! Dual  { cpu, pid, stateData{..}, historyData{..} }                  state + history
//! Tri   { cpu, pid, stateData, historyData, beaconData,
//!         latestFinalizedBlock?, latestOptimisticBlock? }             state + history + beacon
//! ```
//!
//! [`StatsPayload`] is untagged and tries the newest generation first.
//! Per-network blocks (`stateData`, ...) use snake_case field names; the flat record is camelCase.
//! Missing numeric fields decode as zero; no further validation is performed.

use serde::{Deserialize, Serialize};

/// Metrics of one content network as reported by the node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetworkData {
    /// Storage radius, in percent of the key space.
    pub radius: f64,
    /// Content currently stored, in MB.
    pub content_current: f64,
    /// Content capacity, in MB.
    pub content_total: f64,
    /// Number of stored content items.
    pub count: u64,
    /// Disk usage of the node database, in MB.
    pub disk_usage: f64,
    pub offers_in: u64,
    pub offers_out: u64,
    pub accepts_in: u64,
    pub accepts_out: u64,
    pub validations_in: u64,
    pub validations_out: u64,
}

/// First generation: a single flat record for the history network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatStats {
    #[serde(default)]
    pub cpu: f32,
    #[serde(default)]
    pub pid: u32,
    pub radius: f64,
    #[serde(default)]
    pub content_current: f64,
    #[serde(default)]
    pub content_total: f64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub disk_usage: f64,
    #[serde(default)]
    pub offers_in: u64,
    #[serde(default)]
    pub offers_out: u64,
    #[serde(default)]
    pub accepts_in: u64,
    #[serde(default)]
    pub accepts_out: u64,
    #[serde(default)]
    pub validations_in: u64,
    #[serde(default)]
    pub validations_out: u64,
}

impl FlatStats {
    /// Returns the network block carried by the flat record.
    pub fn network(&self) -> SubnetworkData {
        SubnetworkData {
            radius: self.radius,
            content_current: self.content_current,
            content_total: self.content_total,
            count: self.count,
            disk_usage: self.disk_usage,
            offers_in: self.offers_in,
            offers_out: self.offers_out,
            accepts_in: self.accepts_in,
            accepts_out: self.accepts_out,
            validations_in: self.validations_in,
            validations_out: self.validations_out,
        }
    }
}

/// Second generation: state and history networks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualNetworkStats {
    #[serde(default)]
    pub cpu: f32,
    #[serde(default)]
    pub pid: u32,
    pub state_data: SubnetworkData,
    pub history_data: SubnetworkData,
}

/// Third generation: state, history and beacon networks plus chain-sync heads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriNetworkStats {
    #[serde(default)]
    pub cpu: f32,
    #[serde(default)]
    pub pid: u32,
    pub state_data: SubnetworkData,
    pub history_data: SubnetworkData,
    pub beacon_data: SubnetworkData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_finalized_block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_optimistic_block: Option<u64>,
}

/// Telemetry payload carried by a `stats` notification, in any schema generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Tri(TriNetworkStats),
    Dual(DualNetworkStats),
    Flat(FlatStats),
}

impl StatsPayload {
    /// Decodes a payload from its JSON form.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Returns the schema generation (1 = flat, 2 = dual, 3 = tri).
    pub fn generation(&self) -> u8 {
        match self {
            StatsPayload::Flat(_) => 1,
            StatsPayload::Dual(_) => 2,
            StatsPayload::Tri(_) => 3,
        }
    }
}

impl From<TriNetworkStats> for StatsPayload {
    fn from(v: TriNetworkStats) -> Self {
        StatsPayload::Tri(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn newest_schema_is_preferred() {
        let payload = StatsPayload::from_json(json!({
            "cpu": 12.5,
            "pid": 42,
            "stateData": { "radius": 10.0, "disk_usage": 300.5 },
            "historyData": { "radius": 20.5, "offers_in": 3 },
            "beaconData": { "radius": 30 },
            "latestFinalizedBlock": 100
        }))
        .unwrap();

        let StatsPayload::Tri(tri) = payload else {
            panic!("expected third generation, got {payload:?}");
        };
        assert_eq!(tri.pid, 42);
        assert_eq!(tri.state_data.disk_usage, 300.5);
        assert_eq!(tri.history_data.offers_in, 3);
        assert_eq!(tri.history_data.radius, 20.5);
        assert_eq!(tri.beacon_data.radius, 30.0);
        assert_eq!(tri.latest_finalized_block, Some(100));
        assert_eq!(tri.latest_optimistic_block, None);
    }

    #[test]
    fn two_network_payload_decodes_as_dual() {
        let payload = StatsPayload::from_json(json!({
            "cpu": 1.0,
            "pid": 7,
            "stateData": { "radius": 1 },
            "historyData": { "radius": 2 }
        }))
        .unwrap();
        assert_eq!(payload.generation(), 2);
    }

    #[test]
    fn flat_payload_uses_camel_case() {
        let payload = StatsPayload::from_json(json!({
            "cpu": 3.0,
            "radius": 55,
            "contentCurrent": 12.0,
            "contentTotal": 100.0,
            "diskUsage": 40.0,
            "validationsOut": 9
        }))
        .unwrap();

        let StatsPayload::Flat(flat) = payload else {
            panic!("expected flat generation");
        };
        let net = flat.network();
        assert_eq!(net.radius, 55.0);
        assert_eq!(net.content_total, 100.0);
        assert_eq!(net.disk_usage, 40.0);
        assert_eq!(net.validations_out, 9);
    }

    #[test]
    fn radius_decodes_from_integers_and_floats() {
        let payload = StatsPayload::from_json(json!({
            "cpu": 1.0,
            "pid": 7,
            "stateData": { "radius": 10.0 },
            "historyData": { "radius": 2 },
            "beaconData": { "radius": 3.25 }
        }))
        .unwrap();

        let StatsPayload::Tri(tri) = payload else {
            panic!("expected third generation, got {payload:?}");
        };
        assert_eq!(tri.state_data.radius, 10.0);
        assert_eq!(tri.history_data.radius, 2.0);
        assert_eq!(tri.beacon_data.radius, 3.25);
    }

    #[test]
    fn unrecognised_shape_is_rejected() {
        assert!(StatsPayload::from_json(json!({ "cpu": 1.0 })).is_err());
    }
}
