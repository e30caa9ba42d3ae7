//! # trinvisor
//!
//! **Trinvisor** is the state core of a desktop front-end for a Trin portal node.
//!
//! It keeps three pieces of reactive state in sync with a host-side process bridge and a
//! persisted settings store: the node configuration, the node's run status (with automatic
//! restart after a crash) and a live telemetry snapshot.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌────────────────┐        ┌──────────────────────────────────────────────────┐
//!  │  ConfigStore   │◄──────►│ ConfigState        current NodeConfig (watch)    │
//!  │ (config.json)  │        └───────────┬──────────────────────────────────────┘
//!  └────────────────┘                    │ current()
//!                                        ▼
//!  ┌────────────────┐ launch ┌──────────────────────────────────────────────────┐
//!  │ ProcessBridge  │◄───────│ ProcessSupervisor  status + launching (watch)    │
//!  │ (SidecarBridge)│shutdown└──────────────────────────────────────────────────┘
//!  └───────┬────────┘                    ▲ NodeCrashed → recover_from_crash()
//!          │ publish                     │
//!          ▼                             │
//!  ┌────────────────────────────┐        │
//!  │  Bus (broadcast channel)   │────────┤
//!  └────────────────────────────┘        │ NodeStats → apply()
//!                                        ▼
//!                        ┌──────────────────────────────────────────────────┐
//!                        │ TelemetryState     TelemetrySnapshot (watch)     │
//!                        └──────────────────────────────────────────────────┘
//!
//! Failures of any operation surface as a Notification through the Notifier.
//! ```
//!
//! ### Lifecycle
//! ```text
//! ShellBuilder::new(bridge, store).build() ──► Shell
//!
//! Shell::start()
//!   ├─► attach crash recovery, telemetry (and LogWriter) to bridge.bus()
//!   └─► ConfigState::initialize()
//!         ├─ store empty  ─► write defaults
//!         └─ otherwise    ─► load every key (fallback to defaults per key)
//!
//! user actions:
//!   ConfigState::update(patch)      ─► store + memory, one notification
//!   ProcessSupervisor::toggle()     ─► launch(current config) / shutdown()
//!
//! bridge notifications:
//!   NodeCrashed ─► status = Stopped, notify, launch(current config)
//!   NodeStats   ─► snapshot replaced
//!
//! Shell::stop() ─► subscriptions detached
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Configuration** | Persisted node settings with defaults and partial updates.    | [`ConfigState`], [`NodeConfig`], [`ConfigPatch`] |
//! | **Supervision**   | Launch / shutdown / toggle, crash auto-restart.               | [`ProcessSupervisor`], [`ProcessState`]     |
//! | **Telemetry**     | Live metrics normalized from three payload generations.       | [`TelemetryState`], [`TelemetrySnapshot`]   |
//! | **Bridge API**    | Host-side process control and notifications.                  | [`ProcessBridge`], [`Autostart`], [`Bus`]   |
//! | **Subscriber API**| Hook into bridge notifications.                               | [`Subscribe`], [`Subscription`]             |
//! | **Storage**       | Key-value settings persistence.                               | [`ConfigStore`], [`JsonFileStore`]          |
//! | **Errors**        | Typed errors for bridge, store and configuration failures.    | [`BridgeError`], [`StoreError`], [`ConfigError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//! - `sidecar`: the [`sidecar`] module, a bridge that runs the node binary as a child process.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use trinvisor::{BridgeError, Bus, MemoryStore, NodeConfig, ProcessBridge, ProcessStatus, ShellBuilder};
//!
//! struct Accepting {
//!     bus: Bus,
//! }
//!
//! #[async_trait]
//! impl ProcessBridge for Accepting {
//!     async fn launch(&self, _config: &NodeConfig) -> Result<(), BridgeError> {
//!         Ok(())
//!     }
//!
//!     async fn shutdown(&self) -> Result<(), BridgeError> {
//!         Ok(())
//!     }
//!
//!     fn bus(&self) -> &Bus {
//!         &self.bus
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Arc::new(Accepting { bus: Bus::default() });
//!     let shell = ShellBuilder::new(bridge, Arc::new(MemoryStore::new())).build();
//!
//!     let cfg = shell.start().await?;
//!     assert_eq!(cfg, NodeConfig::default());
//!
//!     shell.supervisor().toggle().await;
//!     assert_eq!(shell.supervisor().status(), ProcessStatus::Running);
//!
//!     shell.stop().await;
//!     Ok(())
//! }
//! ```
mod bridge;
mod config;
mod error;
mod events;
mod notify;
mod shell;
mod store;
mod subscribers;
mod supervisor;
mod telemetry;

pub mod format;
pub mod routes;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use bridge::{
    Autostart, DualNetworkStats, FlatStats, NoopAutostart, ProcessBridge, StatsPayload,
    SubnetworkData, TriNetworkStats,
};
pub use config::{
    ConfigKey, ConfigPatch, ConfigState, DEFAULT_AUTOSTART, DEFAULT_HTTP_PORT, DEFAULT_STORAGE,
    NodeConfig, UNSET_ROOT,
};
pub use error::{BridgeError, ConfigError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, Severity};
pub use shell::{Shell, ShellBuilder};
pub use store::{CONFIG_STORE_ID, ConfigStore, JsonFileStore, MemoryStore};
pub use subscribers::{Subscribe, Subscription};
pub use supervisor::{ProcessState, ProcessStatus, ProcessSupervisor};
pub use telemetry::{NetworkMetrics, TelemetrySnapshot, TelemetryState};

// Optional: a process bridge that spawns the node binary.
// Enable with: `--features sidecar`
#[cfg(feature = "sidecar")]
pub mod sidecar;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
