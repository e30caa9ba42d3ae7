//! # Configuration state: in-memory copy of the node configuration.
//!
//! [`ConfigState`] owns the current [`NodeConfig`] and mediates every read and write
//! against the settings store.
//!
//! ## Initialization
//! ```text
//! initialize()
//!   ├─ store.get("httpPort") is absent/null  → write defaults, publish defaults
//!   └─ otherwise                             → read every key, missing/undecodable → default
//! ```
//!
//! ## Update
//! ```text
//! update(patch)                  fields in order: storage, httpPort, autostart, root
//!   for each Some(field):
//!     ├─ (autostart only) enable/disable registration
//!     ├─ store.set(key, value)
//!     └─ publish into memory
//!   first failure aborts; earlier fields stay written (no rollback)
//!   exactly one notification: success or failure
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::watch;

use super::node::{ConfigKey, ConfigPatch, NodeConfig};
use crate::bridge::Autostart;
use crate::error::ConfigError;
use crate::notify::{Notification, Notifier};
use crate::store::ConfigStore;

const UPDATED: &str = "Configuration updated successfully.";
const UPDATE_FAILED: &str = "Failed to update configuration.";
const LOAD_FAILED: &str = "Failed to load configuration.";

/// Owner of the desired node configuration.
pub struct ConfigState {
    store: Arc<dyn ConfigStore>,
    autostart: Arc<dyn Autostart>,
    notifier: Arc<dyn Notifier>,
    current: watch::Sender<NodeConfig>,
}

impl ConfigState {
    /// Creates the state holding [`NodeConfig::default`] until [`initialize`](Self::initialize) runs.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        autostart: Arc<dyn Autostart>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (current, _rx) = watch::channel(NodeConfig::default());
        Self {
            store,
            autostart,
            notifier,
            current,
        }
    }

    /// Returns a copy of the current configuration.
    pub fn current(&self) -> NodeConfig {
        self.current.borrow().clone()
    }

    /// Receiver that observes every configuration change.
    pub fn subscribe(&self) -> watch::Receiver<NodeConfig> {
        self.current.subscribe()
    }

    /// Loads the persisted configuration, writing defaults on first run.
    ///
    /// On failure a destructive notification is issued and the error is returned;
    /// the in-memory configuration is left untouched.
    pub async fn initialize(&self) -> Result<NodeConfig, ConfigError> {
        match self.load().await {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                tracing::warn!(error = %e, label = e.as_label(), "configuration load failed");
                self.notifier.notify(Notification::failure(LOAD_FAILED, &e));
                Err(e)
            }
        }
    }

    /// Applies `patch` field by field, persisting each one.
    ///
    /// Issues one notification describing the outcome. A failure stops at the failing field;
    /// fields applied before it remain persisted.
    pub async fn update(&self, patch: ConfigPatch) {
        match self.apply(patch).await {
            Ok(()) => self.notifier.notify(Notification::normal(UPDATED)),
            Err(e) => {
                tracing::warn!(error = %e, label = e.as_label(), "configuration update failed");
                self.notifier.notify(Notification::failure(UPDATE_FAILED, &e));
            }
        }
    }

    async fn load(&self) -> Result<NodeConfig, ConfigError> {
        let port = self.store.get(ConfigKey::HttpPort.as_str()).await?;
        if matches!(port, None | Some(Value::Null)) {
            let defaults = NodeConfig::default();
            self.write_all(&defaults).await?;
            self.current.send_replace(defaults.clone());
            tracing::info!("settings store was empty; defaults written");
            return Ok(defaults);
        }

        let d = NodeConfig::default();
        let cfg = NodeConfig {
            http_port: decode(ConfigKey::HttpPort, port, d.http_port),
            storage: decode(ConfigKey::Storage, self.read(ConfigKey::Storage).await?, d.storage),
            autostart: decode(
                ConfigKey::Autostart,
                self.read(ConfigKey::Autostart).await?,
                d.autostart,
            ),
            trusted_checkpoint_root: decode(
                ConfigKey::TrustedCheckpointRoot,
                self.read(ConfigKey::TrustedCheckpointRoot).await?,
                d.trusted_checkpoint_root,
            ),
        };
        tracing::debug!(?cfg, "configuration loaded");
        self.current.send_replace(cfg.clone());
        Ok(cfg)
    }

    async fn read(&self, key: ConfigKey) -> Result<Option<Value>, ConfigError> {
        Ok(self.store.get(key.as_str()).await?)
    }

    async fn write(&self, key: ConfigKey, value: Value) -> Result<(), ConfigError> {
        Ok(self.store.set(key.as_str(), value).await?)
    }

    async fn write_all(&self, cfg: &NodeConfig) -> Result<(), ConfigError> {
        self.write(ConfigKey::HttpPort, json!(cfg.http_port)).await?;
        self.write(ConfigKey::Storage, json!(cfg.storage)).await?;
        self.write(ConfigKey::Autostart, json!(cfg.autostart)).await?;
        self.write(
            ConfigKey::TrustedCheckpointRoot,
            json!(cfg.trusted_checkpoint_root),
        )
        .await
    }

    async fn apply(&self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(storage) = patch.storage {
            self.write(ConfigKey::Storage, json!(storage)).await?;
            self.current.send_modify(|c| c.storage = storage);
        }
        if let Some(port) = patch.http_port {
            self.write(ConfigKey::HttpPort, json!(port)).await?;
            self.current.send_modify(|c| c.http_port = port);
        }
        if let Some(on) = patch.autostart {
            self.autostart.set_enabled(on).await?;
            self.write(ConfigKey::Autostart, json!(on)).await?;
            self.current.send_modify(|c| c.autostart = on);
        }
        if let Some(root) = patch.trusted_checkpoint_root {
            self.write(ConfigKey::TrustedCheckpointRoot, json!(root))
                .await?;
            self.current
                .send_modify(|c| c.trusted_checkpoint_root = root);
        }
        Ok(())
    }
}

/// Decodes a persisted value, falling back to `default` when absent, `null` or malformed.
fn decode<T: DeserializeOwned>(key: ConfigKey, value: Option<Value>, default: T) -> T {
    match value {
        None | Some(Value::Null) => default,
        Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
            tracing::warn!(key = key.as_str(), error = %e, "ignoring malformed setting");
            default
        }),
    }
}
