//! # Process bridge abstraction.
//!
//! A [`ProcessBridge`] is the host-side half of the shell: it starts and stops the node
//! process and publishes asynchronous notifications on its [`Bus`].
//!
//! ```text
//! ProcessSupervisor ── launch(&NodeConfig) ──► bridge ──► node process
//!                   ── shutdown()          ──►
//!
//! bridge ── Event::crashed() / Event::stats(..) ──► Bus ──► subscriptions
//! ```
//!
//! Bridge calls are trusted to eventually settle; the shell applies no timeout or cancellation.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use trinvisor::{BridgeError, Bus, NodeConfig, ProcessBridge};
//!
//! struct Offline {
//!     bus: Bus,
//! }
//!
//! #[async_trait]
//! impl ProcessBridge for Offline {
//!     async fn launch(&self, _config: &NodeConfig) -> Result<(), BridgeError> {
//!         Err(BridgeError::rejected("offline"))
//!     }
//!
//!     async fn shutdown(&self) -> Result<(), BridgeError> {
//!         Err(BridgeError::NotRunning)
//!     }
//!
//!     fn bus(&self) -> &Bus {
//!         &self.bus
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::config::NodeConfig;
use crate::error::BridgeError;
use crate::events::Bus;

/// Remote control over the supervised node process.
#[async_trait]
pub trait ProcessBridge: Send + Sync + 'static {
    /// Starts the node with the given configuration.
    async fn launch(&self, config: &NodeConfig) -> Result<(), BridgeError>;

    /// Stops the node.
    async fn shutdown(&self) -> Result<(), BridgeError>;

    /// Bus on which `NodeCrashed` and `NodeStats` notifications are published.
    fn bus(&self) -> &Bus;
}
