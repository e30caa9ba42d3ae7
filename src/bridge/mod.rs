//! # Process bridge: the host-side collaborator of the shell.
//!
//! ## Contents
//! - [`ProcessBridge`] launch / shutdown requests and the notification [`Bus`](crate::Bus)
//! - [`Autostart`] OS-level launch-at-login registration, [`NoopAutostart`]
//! - [`StatsPayload`] wire schema of the `stats` notification (three generations)

mod autostart;
mod payload;
mod process;

pub use autostart::{Autostart, NoopAutostart};
pub use payload::{DualNetworkStats, FlatStats, StatsPayload, SubnetworkData, TriNetworkStats};
pub use process::ProcessBridge;
