//! # ProcessSupervisor: run status and lifecycle requests for the node.
//!
//! ## State machine
//! ```text
//!             launch ok / crash-restart ok
//!   Stopped ─────────────────────────────────► Running
//!      ▲                                          │
//!      └──────────────────────────────────────────┘
//!             shutdown ok / crash notification
//!
//! launching = true  for the duration of every launch/shutdown request
//! ```
//!
//! ## Rules
//! - Status changes are all-or-nothing: a failed request leaves the status as it was.
//! - Every failed request produces exactly one destructive notification.
//! - `launching` is cleared by a scoped guard, on success, failure or cancellation.
//! - Crash recovery is unconditional and unbounded: no backoff, no retry cap, and no
//!   mutual exclusion with a manual request that is already in flight.

use std::sync::Arc;

use tokio::sync::watch;

use super::crash::CrashRecovery;
use super::status::{ProcessState, ProcessStatus};
use crate::bridge::ProcessBridge;
use crate::config::{ConfigState, NodeConfig};
use crate::events::Bus;
use crate::notify::{Notification, Notifier};
use crate::subscribers::{Subscribe, Subscription};

const LAUNCH_FAILED: &str = "Failed to launch Trin.";
const SHUTDOWN_FAILED: &str = "Failed to shutdown Trin.";
const CRASHED: &str = "Trin process has crashed! Restarting your node.";

/// Issues launch/shutdown requests and tracks the node's run status.
pub struct ProcessSupervisor {
    bridge: Arc<dyn ProcessBridge>,
    config: Arc<ConfigState>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<ProcessState>,
}

impl ProcessSupervisor {
    /// Creates a supervisor in the `Stopped` state.
    pub fn new(
        bridge: Arc<dyn ProcessBridge>,
        config: Arc<ConfigState>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _rx) = watch::channel(ProcessState::default());
        Self {
            bridge,
            config,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> ProcessState {
        *self.state.borrow()
    }

    pub fn status(&self) -> ProcessStatus {
        self.state.borrow().status
    }

    pub fn is_launching(&self) -> bool {
        self.state.borrow().launching
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ProcessState> {
        self.state.subscribe()
    }

    /// Shuts the node down when running, launches it with the current configuration otherwise.
    pub async fn toggle(&self) {
        match self.status() {
            ProcessStatus::Running => self.shutdown().await,
            ProcessStatus::Stopped => {
                let config = self.config.current();
                self.launch(&config).await;
            }
        }
    }

    /// Asks the bridge to start the node with `config`.
    pub async fn launch(&self, config: &NodeConfig) {
        let _launching = LaunchingGuard::engage(&self.state);
        tracing::info!(
            port = config.http_port,
            storage = config.storage,
            "launching node"
        );

        match self.bridge.launch(config).await {
            Ok(()) => {
                self.set_status(ProcessStatus::Running);
                tracing::info!("node running");
            }
            Err(e) => {
                tracing::warn!(error = %e, label = e.as_label(), "node launch failed");
                self.notifier.notify(Notification::failure(LAUNCH_FAILED, &e));
            }
        }
    }

    /// Asks the bridge to stop the node.
    pub async fn shutdown(&self) {
        let _launching = LaunchingGuard::engage(&self.state);
        tracing::info!("shutting down node");

        match self.bridge.shutdown().await {
            Ok(()) => {
                self.set_status(ProcessStatus::Stopped);
                tracing::info!("node stopped");
            }
            Err(e) => {
                tracing::warn!(error = %e, label = e.as_label(), "node shutdown failed");
                self.notifier
                    .notify(Notification::failure(SHUTDOWN_FAILED, &e));
            }
        }
    }

    /// Reacts to a crash notification: mark stopped, tell the user, launch again.
    ///
    /// The restart uses the configuration current at the time of the crash.
    pub async fn recover_from_crash(&self) {
        self.set_status(ProcessStatus::Stopped);
        self.notifier.notify(Notification::destructive(CRASHED));
        let config = self.config.current();
        self.launch(&config).await;
    }

    /// Starts the standing crash subscription on `bus`.
    pub fn watch_crashes(self: &Arc<Self>, bus: &Bus) -> Subscription {
        let recovery = CrashRecovery::new(Arc::clone(self));
        Subscription::spawn(bus, Arc::new(recovery) as Arc<dyn Subscribe>)
    }

    fn set_status(&self, status: ProcessStatus) {
        self.state.send_modify(|s| s.status = status);
    }
}

/// Holds `launching = true` for its lifetime.
struct LaunchingGuard<'a> {
    state: &'a watch::Sender<ProcessState>,
}

impl<'a> LaunchingGuard<'a> {
    fn engage(state: &'a watch::Sender<ProcessState>) -> Self {
        state.send_modify(|s| s.launching = true);
        Self { state }
    }
}

impl Drop for LaunchingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.launching = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::NoopAutostart;
    use crate::events::Event;
    use crate::notify::Severity;
    use crate::store::MemoryStore;
    use crate::testing::{Call, RecordingNotifier, ScriptedBridge, WAIT};
    use tokio::time::timeout;

    struct Fixture {
        bridge: Arc<ScriptedBridge>,
        notes: Arc<RecordingNotifier>,
        config: Arc<ConfigState>,
        sup: Arc<ProcessSupervisor>,
    }

    fn fixture(bridge: ScriptedBridge) -> Fixture {
        let bridge = Arc::new(bridge);
        let notes = Arc::new(RecordingNotifier::default());
        let config = Arc::new(ConfigState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NoopAutostart),
            notes.clone(),
        ));
        let sup = Arc::new(ProcessSupervisor::new(
            bridge.clone(),
            config.clone(),
            notes.clone(),
        ));
        Fixture {
            bridge,
            notes,
            config,
            sup,
        }
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        timeout(WAIT, async {
            while !cond() {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn launch_success_marks_running() {
        let f = fixture(ScriptedBridge::new());
        assert_eq!(f.sup.state(), ProcessState::default());

        f.sup.launch(&NodeConfig::default()).await;

        assert_eq!(f.sup.status(), ProcessStatus::Running);
        assert!(!f.sup.is_launching());
        assert!(f.notes.all().is_empty());
    }

    #[tokio::test]
    async fn launch_rejection_keeps_status_and_notifies_once() {
        let f = fixture(ScriptedBridge::new());
        f.bridge.fail_next_launch("port in use");

        f.sup.launch(&NodeConfig::default()).await;

        assert_eq!(f.sup.status(), ProcessStatus::Stopped);
        assert!(!f.sup.is_launching());
        let notes = f.notes.all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, LAUNCH_FAILED);
        assert_eq!(notes[0].description.as_deref(), Some("Error: port in use"));
        assert_eq!(notes[0].severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn shutdown_failure_keeps_running() {
        let f = fixture(ScriptedBridge::new());
        f.sup.launch(&NodeConfig::default()).await;
        f.bridge.fail_next_shutdown("no such process");

        f.sup.shutdown().await;

        assert_eq!(f.sup.status(), ProcessStatus::Running);
        assert!(!f.sup.is_launching());
        assert_eq!(f.notes.titles(), vec![SHUTDOWN_FAILED]);

        f.sup.shutdown().await;
        assert_eq!(f.sup.status(), ProcessStatus::Stopped);
    }

    #[tokio::test]
    async fn toggle_flips_status_using_current_config() {
        let f = fixture(ScriptedBridge::new());
        let mut calls = f.bridge.calls();

        let before = f.sup.status();
        f.sup.toggle().await;
        assert_eq!(f.sup.status(), before.toggled());
        assert_eq!(calls.try_recv().unwrap(), Call::Launch(f.config.current()));

        f.sup.toggle().await;
        assert_eq!(f.sup.status(), ProcessStatus::Stopped);
        assert_eq!(calls.try_recv().unwrap(), Call::Shutdown);
    }

    #[tokio::test]
    async fn launching_is_set_only_while_request_is_in_flight() {
        let f = fixture(ScriptedBridge::gated());
        let mut calls = f.bridge.calls();
        assert!(!f.sup.is_launching());

        let sup = f.sup.clone();
        let pending = tokio::spawn(async move { sup.launch(&NodeConfig::default()).await });

        timeout(WAIT, calls.recv()).await.unwrap().unwrap();
        assert!(f.sup.is_launching());
        assert_eq!(f.sup.status(), ProcessStatus::Stopped);

        f.bridge.release();
        pending.await.unwrap();
        assert!(!f.sup.is_launching());
        assert_eq!(f.sup.status(), ProcessStatus::Running);
    }

    #[tokio::test]
    async fn cancelled_request_still_clears_launching() {
        let f = fixture(ScriptedBridge::gated());
        let mut calls = f.bridge.calls();

        let sup = f.sup.clone();
        let pending = tokio::spawn(async move { sup.shutdown().await });
        timeout(WAIT, calls.recv()).await.unwrap().unwrap();
        assert!(f.sup.is_launching());

        pending.abort();
        let _ = pending.await;
        assert!(!f.sup.is_launching());
    }

    #[tokio::test]
    async fn crash_marks_stopped_and_relaunches_once() {
        let f = fixture(ScriptedBridge::new());
        f.sup.launch(&NodeConfig::default()).await;
        let sub = f.sup.watch_crashes(f.bridge.bus());
        f.bridge.fail_next_launch("still broken");

        f.bridge.bus().publish(Event::crashed());
        wait_until(|| f.notes.all().len() == 2).await;

        // The restart failed, so the forced Stopped is still visible.
        assert_eq!(f.sup.status(), ProcessStatus::Stopped);
        assert_eq!(f.bridge.launches(), 2);
        assert_eq!(f.notes.titles(), vec![CRASHED, LAUNCH_FAILED]);
        assert!(f.notes.all()[0].is_destructive());
        assert!(!f.sup.is_launching());
        sub.stop().await;
    }

    #[tokio::test]
    async fn crash_restart_uses_current_config() {
        let f = fixture(ScriptedBridge::new());
        f.config
            .update(crate::ConfigPatch::default().with_http_port(9555))
            .await;
        let mut calls = f.bridge.calls();
        let sub = f.sup.watch_crashes(f.bridge.bus());

        f.bridge.bus().publish(Event::crashed().with_reason("signal: 9"));

        let call = timeout(WAIT, calls.recv()).await.unwrap().unwrap();
        let Call::Launch(cfg) = call else {
            panic!("expected a launch, got {call:?}");
        };
        assert_eq!(cfg.http_port, 9555);
        wait_until(|| f.sup.status() == ProcessStatus::Running).await;
        assert_eq!(f.bridge.launches(), 1);
        sub.stop().await;
    }

    #[tokio::test]
    async fn stats_events_do_not_trigger_restart() {
        let f = fixture(ScriptedBridge::new());
        let bus = crate::Bus::new(16);
        let sub = f.sup.watch_crashes(&bus);

        bus.publish(Event::stats(crate::bridge::StatsPayload::Tri(
            Default::default(),
        )));
        bus.publish(Event::stats(crate::bridge::StatsPayload::Tri(
            Default::default(),
        )));
        bus.publish(Event::crashed());
        // Closing the bus lets the worker drain every queued event and exit.
        drop(bus);
        wait_until(|| !sub.is_active()).await;

        assert_eq!(f.bridge.launches(), 1);
        assert_eq!(f.notes.titles(), vec![CRASHED]);
        assert_eq!(f.sup.status(), ProcessStatus::Running);
        sub.stop().await;
    }
}
