//! # Shell: composition root for the desktop front-end state.
//!
//! ## Architecture
//! ```text
//! ShellBuilder::build()
//!   ├─► ConfigState        (store + autostart + notifier)
//!   ├─► ProcessSupervisor  (bridge + ConfigState + notifier)
//!   └─► TelemetryState
//!
//! Shell::start()
//!   ├─► attach CrashRecovery   ─┐
//!   ├─► attach TelemetryState   ├─► bridge.bus()
//!   ├─► attach LogWriter       ─┘   (feature "logging")
//!   └─► ConfigState::initialize()
//! ```
//!
//! ## Rules
//! - Subscriptions are attached before the configuration is loaded, so no bridge
//!   notification published after `start` begins is missed.
//! - `start` on a started shell detaches the old subscriptions first; there is never
//!   more than one crash subscription per shell.
//! - `start` and `stop` are serialized on the subscription list; concurrent calls run
//!   one after another.
//! - `stop` detaches and waits for every subscription; the node process is left alone.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bridge::ProcessBridge;
use crate::config::{ConfigState, NodeConfig};
use crate::error::ConfigError;
use crate::subscribers::Subscription;
use crate::supervisor::ProcessSupervisor;
use crate::telemetry::TelemetryState;

/// Owns the configuration, supervisor and telemetry state plus their subscriptions.
pub struct Shell {
    bridge: Arc<dyn ProcessBridge>,
    config: Arc<ConfigState>,
    supervisor: Arc<ProcessSupervisor>,
    telemetry: Arc<TelemetryState>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl Shell {
    pub(super) fn new_internal(
        bridge: Arc<dyn ProcessBridge>,
        config: Arc<ConfigState>,
        supervisor: Arc<ProcessSupervisor>,
        telemetry: Arc<TelemetryState>,
    ) -> Self {
        Self {
            bridge,
            config,
            supervisor,
            telemetry,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Arc<ConfigState> {
        &self.config
    }

    pub fn supervisor(&self) -> &Arc<ProcessSupervisor> {
        &self.supervisor
    }

    pub fn telemetry(&self) -> &Arc<TelemetryState> {
        &self.telemetry
    }

    /// Whether bridge subscriptions are currently attached.
    pub async fn is_started(&self) -> bool {
        !self.subscriptions.lock().await.is_empty()
    }

    /// Attaches the bridge subscriptions and loads the configuration.
    ///
    /// The subscriptions stay attached even when loading fails; the error is returned
    /// after the failure notification has been issued.
    pub async fn start(&self) -> Result<NodeConfig, ConfigError> {
        let mut attached = self.subscriptions.lock().await;
        detach(&mut attached).await;

        let bus = self.bridge.bus();
        #[cfg_attr(not(feature = "logging"), allow(unused_mut))]
        let mut subs = vec![
            self.supervisor.watch_crashes(bus),
            self.telemetry.watch(bus),
        ];
        #[cfg(feature = "logging")]
        subs.push(Subscription::spawn(
            bus,
            Arc::new(crate::subscribers::LogWriter::new()),
        ));
        tracing::debug!(count = subs.len(), "shell subscriptions attached");
        attached.extend(subs);
        drop(attached);

        let cfg = self.config.initialize().await?;
        tracing::info!(port = cfg.http_port, autostart = cfg.autostart, "shell started");
        Ok(cfg)
    }

    /// Detaches every bridge subscription.
    pub async fn stop(&self) {
        detach(&mut *self.subscriptions.lock().await).await;
    }
}

async fn detach(subs: &mut Vec<Subscription>) {
    if subs.is_empty() {
        return;
    }
    for sub in subs.drain(..) {
        sub.stop().await;
    }
    tracing::debug!("shell subscriptions detached");
}
