//! # Node configuration record.
//!
//! [`NodeConfig`] is the user-editable configuration handed to the bridge on launch.
//! [`ConfigPatch`] carries a partial update; only `Some` fields are applied.
//!
//! ## Persisted keys
//! | Field                     | Store key               | Default |
//! |---------------------------|-------------------------|---------|
//! | `storage`                 | `storage`               | `2000`  |
//! | `http_port`               | `httpPort`              | `8545`  |
//! | `autostart`               | `autostart`             | `true`  |
//! | `trusted_checkpoint_root` | `trustedCheckpointRoot` | `"0x"`  |
//!
//! `httpPort` is the primary key: a store without it is treated as uninitialized.

use serde::{Deserialize, Serialize};

/// Default content storage capacity (MB).
pub const DEFAULT_STORAGE: u64 = 2000;
/// Default JSON-RPC listen port.
pub const DEFAULT_HTTP_PORT: u16 = 8545;
/// Default launch-at-login setting.
pub const DEFAULT_AUTOSTART: bool = true;
/// Sentinel meaning "no trusted checkpoint root".
pub const UNSET_ROOT: &str = "0x";

/// Store keys of the persisted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Storage,
    HttpPort,
    Autostart,
    TrustedCheckpointRoot,
}

impl ConfigKey {
    /// Key name inside the settings store.
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Storage => "storage",
            ConfigKey::HttpPort => "httpPort",
            ConfigKey::Autostart => "autostart",
            ConfigKey::TrustedCheckpointRoot => "trustedCheckpointRoot",
        }
    }
}

/// Desired configuration of the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    /// Storage capacity for node content, in MB.
    pub storage: u64,
    /// JSON-RPC listen port.
    pub http_port: u16,
    /// Whether the application launches at login.
    pub autostart: bool,
    /// Hex-encoded trusted checkpoint root; `"0x"` means unset.
    pub trusted_checkpoint_root: String,
}

impl NodeConfig {
    /// Returns the trusted checkpoint root unless it is the `"0x"` sentinel (or empty).
    pub fn checkpoint_root(&self) -> Option<&str> {
        match self.trusted_checkpoint_root.as_str() {
            "" | UNSET_ROOT => None,
            root => Some(root),
        }
    }
}

impl Default for NodeConfig {
    /// Default configuration written on first run:
    ///
    /// - `storage = 2000`
    /// - `http_port = 8545`
    /// - `autostart = true`
    /// - `trusted_checkpoint_root = "0x"`
    fn default() -> Self {
        Self {
            storage: DEFAULT_STORAGE,
            http_port: DEFAULT_HTTP_PORT,
            autostart: DEFAULT_AUTOSTART,
            trusted_checkpoint_root: UNSET_ROOT.to_string(),
        }
    }
}

/// Partial configuration update.
///
/// # Example
/// ```
/// use trinvisor::ConfigPatch;
///
/// let patch = ConfigPatch::default().with_http_port(9000);
/// assert_eq!(patch.http_port, Some(9000));
/// assert!(patch.storage.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub storage: Option<u64>,
    pub http_port: Option<u16>,
    pub autostart: Option<bool>,
    pub trusted_checkpoint_root: Option<String>,
}

impl ConfigPatch {
    #[must_use]
    pub fn with_storage(mut self, storage: u64) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = Some(port);
        self
    }

    #[must_use]
    pub fn with_autostart(mut self, on: bool) -> Self {
        self.autostart = Some(on);
        self
    }

    #[must_use]
    pub fn with_trusted_checkpoint_root(mut self, root: impl Into<String>) -> Self {
        self.trusted_checkpoint_root = Some(root.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
            && self.http_port.is_none()
            && self.autostart.is_none()
            && self.trusted_checkpoint_root.is_none()
    }
}

impl From<NodeConfig> for ConfigPatch {
    /// A patch that touches every field.
    fn from(c: NodeConfig) -> Self {
        Self {
            storage: Some(c.storage),
            http_port: Some(c.http_port),
            autostart: Some(c.autostart),
            trusted_checkpoint_root: Some(c.trusted_checkpoint_root),
        }
    }
}
