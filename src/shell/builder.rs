use std::sync::Arc;

use super::shell::Shell;
use crate::bridge::{Autostart, NoopAutostart, ProcessBridge};
use crate::config::ConfigState;
use crate::notify::{LogNotifier, Notifier};
use crate::store::ConfigStore;
use crate::supervisor::ProcessSupervisor;
use crate::telemetry::TelemetryState;

/// Builder for constructing a [`Shell`] with optional collaborators.
pub struct ShellBuilder {
    bridge: Arc<dyn ProcessBridge>,
    store: Arc<dyn ConfigStore>,
    autostart: Arc<dyn Autostart>,
    notifier: Arc<dyn Notifier>,
}

impl ShellBuilder {
    /// Creates a builder around the two mandatory host services.
    ///
    /// Autostart registration defaults to [`NoopAutostart`], notifications to [`LogNotifier`].
    pub fn new(bridge: Arc<dyn ProcessBridge>, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            bridge,
            store,
            autostart: Arc::new(NoopAutostart),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Sets the launch-at-login registration service.
    pub fn with_autostart(mut self, autostart: Arc<dyn Autostart>) -> Self {
        self.autostart = autostart;
        self
    }

    /// Sets where user-facing notifications go.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Wires the three state objects together. Nothing is attached to the bus until
    /// [`Shell::start`] runs.
    pub fn build(self) -> Shell {
        let config = Arc::new(ConfigState::new(
            self.store,
            self.autostart,
            Arc::clone(&self.notifier),
        ));
        let supervisor = Arc::new(ProcessSupervisor::new(
            Arc::clone(&self.bridge),
            Arc::clone(&config),
            self.notifier,
        ));
        let telemetry = Arc::new(TelemetryState::new());
        Shell::new_internal(self.bridge, config, supervisor, telemetry)
    }
}
