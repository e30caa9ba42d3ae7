//! # Sidecar runtime configuration.
//!
//! [`SidecarConfig`] holds the process-side settings of [`SidecarBridge`](super::SidecarBridge).
//! The user-editable part of a launch (port, storage, checkpoint root) comes from
//! [`NodeConfig`](crate::NodeConfig) instead.
//!
//! ## Sentinel values
//! - `readiness_timeout = 0s` → do not wait for the RPC server, report success right after spawn
//! - `unresponsive_limit = 0` → never check liveness over RPC; only a process exit is a crash
//! - `ready_poll_interval`, `stats_interval` → clamped to at least [`MIN_INTERVAL`]
//! - `bus_capacity` → clamped to at least 1

use std::path::PathBuf;
use std::time::Duration;

/// Lower bound applied to the polling intervals.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Process-side settings for the node sidecar.
#[derive(Clone, Debug)]
pub struct SidecarConfig {
    /// Node executable; resolved through `PATH` when not absolute.
    pub binary: PathBuf,

    /// Arguments placed before the generated node flags, for running the node through a
    /// wrapper (`nice -n 10 trin`, `systemd-run --user --scope trin`).
    pub launcher_args: Vec<String>,

    /// Portal subnetworks passed as `--portal-subnetworks`.
    pub subnetworks: Vec<String>,

    /// How long a launch waits for the node to answer `web3_clientVersion`.
    ///
    /// On expiry the child is killed and the launch fails with
    /// [`BridgeError::Unresponsive`](crate::BridgeError::Unresponsive).
    pub readiness_timeout: Duration,

    /// Pause between readiness checks.
    pub ready_poll_interval: Duration,

    /// Period of `NodeStats` notifications while the node runs.
    pub stats_interval: Duration,

    /// Timeout of a single JSON-RPC request to the node.
    pub rpc_timeout: Duration,

    /// Consecutive failed liveness checks after which a running node is killed and
    /// reported as crashed.
    pub unresponsive_limit: u32,

    /// Capacity of the notification bus.
    pub bus_capacity: usize,
}

impl SidecarConfig {
    /// Returns the readiness window as an `Option`.
    ///
    /// - `None` → do not wait
    /// - `Some(d)` → wait up to `d`
    #[inline]
    pub fn readiness_window(&self) -> Option<Duration> {
        if self.readiness_timeout.is_zero() {
            None
        } else {
            Some(self.readiness_timeout)
        }
    }

    #[inline]
    pub fn ready_poll_interval_clamped(&self) -> Duration {
        self.ready_poll_interval.max(MIN_INTERVAL)
    }

    #[inline]
    pub fn stats_interval_clamped(&self) -> Duration {
        self.stats_interval.max(MIN_INTERVAL)
    }

    /// Returns the liveness threshold as an `Option`.
    ///
    /// - `None` → liveness is not checked
    /// - `Some(n)` → `n` consecutive failures make the node unresponsive
    #[inline]
    pub fn liveness_threshold(&self) -> Option<u32> {
        (self.unresponsive_limit > 0).then_some(self.unresponsive_limit)
    }

    #[inline]
    pub fn rpc_timeout_clamped(&self) -> Duration {
        self.rpc_timeout.max(MIN_INTERVAL)
    }

    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Comma-joined subnetwork list as the node expects it.
    pub fn subnetwork_arg(&self) -> String {
        self.subnetworks.join(",")
    }
}

impl Default for SidecarConfig {
    /// Default configuration:
    ///
    /// - `binary = "trin"`
    /// - `launcher_args = []`
    /// - `subnetworks = history,state,beacon`
    /// - `readiness_timeout = 20s`
    /// - `ready_poll_interval = 1s`
    /// - `stats_interval = 3s`
    /// - `rpc_timeout = 10s`
    /// - `unresponsive_limit = 1`
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            binary: PathBuf::from("trin"),
            launcher_args: Vec::new(),
            subnetworks: ["history", "state", "beacon"]
                .into_iter()
                .map(String::from)
                .collect(),
            readiness_timeout: Duration::from_secs(20),
            ready_poll_interval: Duration::from_secs(1),
            stats_interval: Duration::from_secs(3),
            rpc_timeout: Duration::from_secs(10),
            unresponsive_limit: 1,
            bus_capacity: 256,
        }
    }
}
