//! # Telemetry collection for a running node.
//!
//! ```text
//! child stdout ──► read_reports() ──► ReportBoard (latest block per subnetwork)
//!                                          │
//! every stats_interval: StatsLoop ─────────┼─► CpuSampler (blocking pool)
//!                                          ├─► NodeRpc: beacon heads, liveness
//!                                          └─► Event::stats(Tri) ──► Bus
//! ```
//!
//! Both loops exit when the node's cancellation token fires or the pipe closes.
//! After `unresponsive_limit` consecutive unanswered liveness checks the stats loop fires
//! the `hung` token and exits; the exit watcher turns that into a crash.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStdout;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::report::{Subnetwork, parse_report_line};
use super::rpc::NodeRpc;
use crate::bridge::{StatsPayload, SubnetworkData, TriNetworkStats};
use crate::events::{Bus, Event};

/// Latest parsed report of every subnetwork.
#[derive(Debug, Default)]
pub(crate) struct ReportBoard {
    history: SubnetworkData,
    state: SubnetworkData,
    beacon: SubnetworkData,
}

impl ReportBoard {
    pub(crate) fn record(&mut self, net: Subnetwork, data: SubnetworkData) {
        match net {
            Subnetwork::History => self.history = data,
            Subnetwork::State => self.state = data,
            Subnetwork::Beacon => self.beacon = data,
        }
    }

    pub(crate) fn snapshot(&self, cpu: f32, pid: u32) -> TriNetworkStats {
        TriNetworkStats {
            cpu,
            pid,
            state_data: self.state.clone(),
            history_data: self.history.clone(),
            beacon_data: self.beacon.clone(),
            latest_finalized_block: None,
            latest_optimistic_block: None,
        }
    }
}

pub(crate) type SharedBoard = Arc<Mutex<ReportBoard>>;

fn lock(board: &SharedBoard) -> MutexGuard<'_, ReportBoard> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Feeds one stdout line into the board. Returns the subnetwork it updated.
pub(crate) fn ingest(board: &SharedBoard, line: &str) -> Option<Subnetwork> {
    let net = Subnetwork::of_report(line)?;
    match parse_report_line(line) {
        Ok(data) => {
            lock(board).record(net, data);
            Some(net)
        }
        Err(e) => {
            tracing::warn!(network = net.as_str(), error = %e, "failed to parse report line");
            None
        }
    }
}

/// Drains the node's stdout until it closes or `token` fires.
pub(crate) async fn read_reports(stdout: ChildStdout, board: SharedBoard, token: CancellationToken) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = lines.next_line() => next,
        };
        match next {
            Ok(Some(line)) => {
                tracing::trace!(target: "trinvisor::node", "{line}");
                ingest(&board, &line);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "node stdout read failed");
                break;
            }
        }
    }
    tracing::debug!("node stdout reader finished");
}

/// CPU usage of the node process tree.
pub(crate) struct CpuSampler {
    sys: System,
    pid: Pid,
}

impl CpuSampler {
    pub(crate) fn new(pid: u32) -> Self {
        Self {
            sys: System::new(),
            pid: Pid::from_u32(pid),
        }
    }

    /// Usage of the node and its direct children, in percent of one core.
    ///
    /// The first sample after creation reads zero; usage is measured between refreshes.
    pub(crate) fn sample(&mut self) -> f32 {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new().with_cpu(),
        );
        let Some(node) = self.sys.process(self.pid) else {
            return 0.0;
        };
        let children: f32 = self
            .sys
            .processes()
            .values()
            .filter(|p| p.parent() == Some(self.pid))
            .map(|p| p.cpu_usage())
            .sum();
        node.cpu_usage() + children
    }
}

/// Samples CPU usage off the async workers.
///
/// The sampler is handed back on success; a panicked sample leaves `slot` empty and
/// later samples read zero.
async fn sample_cpu(slot: &mut Option<CpuSampler>) -> f32 {
    let Some(mut sampler) = slot.take() else {
        return 0.0;
    };
    match tokio::task::spawn_blocking(move || {
        let usage = sampler.sample();
        (sampler, usage)
    })
    .await
    {
        Ok((sampler, usage)) => {
            *slot = Some(sampler);
            usage
        }
        Err(e) => {
            tracing::warn!(error = %e, "cpu sampling failed");
            0.0
        }
    }
}

/// Periodic stats publisher of one running node.
pub(crate) struct StatsLoop {
    pub(crate) pid: u32,
    pub(crate) board: SharedBoard,
    pub(crate) bus: Bus,
    pub(crate) rpc: Arc<NodeRpc>,
    pub(crate) every: Duration,
    /// `None` disables liveness checks.
    pub(crate) unresponsive_limit: Option<u32>,
}

struct Tick {
    cpu: f32,
    finalized: Option<u64>,
    optimistic: Option<u64>,
    responsive: bool,
}

impl StatsLoop {
    /// Publishes a `Tri` stats notification every `every` until `token` fires.
    ///
    /// Fires `hung` and returns once the node missed `unresponsive_limit` liveness checks
    /// in a row; ticks with a missed check publish nothing.
    pub(crate) async fn run(self, token: CancellationToken, hung: CancellationToken) {
        let mut cpu = Some(CpuSampler::new(self.pid));
        let mut ticker = time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut misses = 0u32;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let tick = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                tick = self.tick(&mut cpu) => tick,
            };

            if !tick.responsive {
                misses += 1;
                let limit = self.unresponsive_limit.unwrap_or(u32::MAX);
                tracing::warn!(pid = self.pid, misses, limit, "node did not answer liveness check");
                if misses >= limit {
                    hung.cancel();
                    break;
                }
                continue;
            }
            misses = 0;

            let mut stats = lock(&self.board).snapshot(tick.cpu, self.pid);
            stats.latest_finalized_block = tick.finalized;
            stats.latest_optimistic_block = tick.optimistic;
            self.bus.publish(Event::stats(StatsPayload::Tri(stats)));
        }
        tracing::debug!(pid = self.pid, "stats sampler finished");
    }

    async fn tick(&self, cpu: &mut Option<CpuSampler>) -> Tick {
        let usage = sample_cpu(cpu).await;
        let (finalized, optimistic) =
            tokio::join!(self.rpc.finalized_block(), self.rpc.optimistic_block());
        let responsive = match self.unresponsive_limit {
            Some(_) => self.rpc.is_responsive().await,
            None => true,
        };
        Tick {
            cpu: usage,
            finalized: head(finalized, "finalized"),
            optimistic: head(optimistic, "optimistic"),
            responsive,
        }
    }
}

fn head<E: std::fmt::Display>(res: Result<Option<u64>, E>, which: &'static str) -> Option<u64> {
    res.unwrap_or_else(|e| {
        tracing::debug!(which, error = %e, "beacon head unavailable");
        None
    })
}
