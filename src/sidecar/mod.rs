//! # Local node sidecar.
//!
//! A concrete [`ProcessBridge`](crate::ProcessBridge) for hosts that run the node binary
//! themselves, plus the OS glue that goes with it.
//!
//! - [`SidecarBridge`] spawns the node, waits until it answers RPC, turns its stdout
//!   reports, CPU usage and beacon heads into `NodeStats`, and reports an exit or a node
//!   that stops answering as `NodeCrashed`
//! - [`NodeRpc`], [`RpcError`] JSON-RPC client for the node's HTTP endpoint
//! - [`SidecarConfig`] process-side settings
//! - [`parse_report_line`], [`Subnetwork`] the node's periodic report format
//! - [`DesktopAutostart`] launch-at-login via an XDG autostart entry
//!
//! Requires the `sidecar` feature (on by default).

mod autostart;
mod bridge;
mod config;
mod report;
mod rpc;
mod stats;

pub use autostart::DesktopAutostart;
pub use bridge::SidecarBridge;
pub use config::{MIN_INTERVAL, SidecarConfig};
pub use report::{ReportError, Subnetwork, parse_report_line};
pub use rpc::{NodeRpc, RpcError};
