//! Crash notification handler that restarts the node.

use std::sync::Arc;

use async_trait::async_trait;

use super::supervisor::ProcessSupervisor;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that turns every `NodeCrashed` into [`ProcessSupervisor::recover_from_crash`].
pub(crate) struct CrashRecovery {
    supervisor: Arc<ProcessSupervisor>,
}

impl CrashRecovery {
    pub(crate) fn new(supervisor: Arc<ProcessSupervisor>) -> Self {
        Self { supervisor }
    }
}

#[async_trait]
impl Subscribe for CrashRecovery {
    async fn on_event(&self, ev: &Event) {
        if ev.kind != EventKind::NodeCrashed {
            return;
        }
        tracing::warn!(
            seq = ev.seq,
            reason = ev.reason.as_deref().unwrap_or("unknown"),
            "node crashed; restarting"
        );
        self.supervisor.recover_from_crash().await;
    }

    fn name(&self) -> &'static str {
        "crash-recovery"
    }
}
