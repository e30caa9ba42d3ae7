//! # LogWriter: bridge event logger
//!
//! A minimal subscriber that mirrors incoming [`Event`]s into `tracing`.
//!
//! ## Example output
//! ```text
//! WARN  [crashed] seq=12 reason="exit status: 101"
//! DEBUG [stats] seq=13 generation=3 cpu=4.2 pid=5150
//! ```

use async_trait::async_trait;

use crate::bridge::StatsPayload;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::NodeCrashed => {
                tracing::warn!(
                    seq = e.seq,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "[crashed]"
                );
            }
            EventKind::NodeStats => {
                let Some(stats) = e.stats.as_deref() else {
                    tracing::debug!(seq = e.seq, "[stats] empty");
                    return;
                };
                let (cpu, pid) = match stats {
                    StatsPayload::Tri(s) => (s.cpu, s.pid),
                    StatsPayload::Dual(s) => (s.cpu, s.pid),
                    StatsPayload::Flat(s) => (s.cpu, s.pid),
                };
                tracing::debug!(
                    seq = e.seq,
                    generation = stats.generation(),
                    cpu,
                    pid,
                    "[stats]"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
