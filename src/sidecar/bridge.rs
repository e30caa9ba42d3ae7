//! # SidecarBridge: the node as a local child process.
//!
//! ## Launch
//! ```text
//! launch(config)
//!   ├─ alive child?                      → Err(AlreadyRunning)
//!   ├─ spawn <binary> [launcher_args] <node flags>   (stdout piped)
//!   ├─ start stdout reader
//!   ├─ poll web3_clientVersion ── answered ───────► continue
//!   │                            ├─ window elapsed ► kill, Err(Unresponsive)
//!   │                            └─ child exited ──► Err(Rejected)
//!   ├─ start exit watcher + stats sampler
//!   └─ Ok(())
//! ```
//!
//! ## Lifecycle of a running node
//! ```text
//! exit watcher ── token cancelled (shutdown) ──► kill child, alive=false
//!              ├─ hung (missed liveness checks) ► kill child, alive=false, publish NodeCrashed
//!              └─ child exits by itself ────────► alive=false, cancel workers, publish NodeCrashed
//! ```
//!
//! The stats sampler doubles as the liveness check: it fires `hung` once the node misses
//! [`SidecarConfig::unresponsive_limit`] `web3_clientVersion` calls in a row.
//!
//! ## Rules
//! - At most one child per bridge; launch and shutdown are serialized.
//! - A requested shutdown never produces `NodeCrashed`.
//! - Dropping the bridge kills the child (`kill_on_drop`).

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::config::SidecarConfig;
use super::rpc::NodeRpc;
use super::stats::{SharedBoard, StatsLoop, read_reports};
use crate::bridge::ProcessBridge;
use crate::config::NodeConfig;
use crate::error::BridgeError;
use crate::events::{Bus, Event};

/// [`ProcessBridge`] that runs the node binary as a child process.
pub struct SidecarBridge {
    cfg: SidecarConfig,
    bus: Bus,
    node: Mutex<Option<RunningNode>>,
}

struct RunningNode {
    pid: u32,
    rpc: Arc<NodeRpc>,
    alive: Arc<AtomicBool>,
    token: CancellationToken,
    exit: JoinHandle<io::Result<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl RunningNode {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Cancels the background tasks (killing the child if still alive) and waits for them.
    async fn stop(self) -> Result<(), BridgeError> {
        self.token.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
        match self.exit.await {
            Ok(res) => res.map_err(BridgeError::Kill),
            Err(join) => Err(BridgeError::Kill(io::Error::other(join))),
        }
    }
}

impl SidecarBridge {
    pub fn new(cfg: SidecarConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            node: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SidecarConfig {
        &self.cfg
    }

    /// Pid of the running child, if any.
    pub async fn pid(&self) -> Option<u32> {
        let node = self.node.lock().await;
        node.as_ref().filter(|n| n.is_alive()).map(|n| n.pid)
    }

    /// RPC client of the running child, if any.
    pub async fn rpc(&self) -> Option<Arc<NodeRpc>> {
        let node = self.node.lock().await;
        node.as_ref()
            .filter(|n| n.is_alive())
            .map(|n| Arc::clone(&n.rpc))
    }

    /// Flags handed to the node for `config`.
    ///
    /// The trusted block root flag is left out while the root is unset.
    pub fn node_args(&self, config: &NodeConfig) -> Vec<String> {
        let mut args = vec![
            "--web3-transport=http".to_string(),
            format!("--portal-subnetworks={}", self.cfg.subnetwork_arg()),
        ];
        if let Some(root) = config.checkpoint_root() {
            args.push(format!("--trusted-block-root={root}"));
        }
        args.push(format!(
            "--web3-http-address=http://127.0.0.1:{}",
            config.http_port
        ));
        args.push(format!("--mb={}", config.storage));
        args
    }

    fn command(&self, config: &NodeConfig) -> Command {
        let mut cmd = Command::new(&self.cfg.binary);
        cmd.args(&self.cfg.launcher_args)
            .args(self.node_args(config))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }

    async fn wait_ready(&self, rpc: &NodeRpc, child: &mut Child) -> Result<(), BridgeError> {
        let Some(window) = self.cfg.readiness_window() else {
            return Ok(());
        };
        let every = self.cfg.ready_poll_interval_clamped();

        tokio::select! {
            ready = time::timeout(window, until_answered(rpc, every)) => {
                ready.map_err(|_| BridgeError::Unresponsive { timeout: window })
            }
            status = child.wait() => {
                let reason = describe_exit(status);
                Err(BridgeError::rejected(format!("node exited during startup: {reason}")))
            }
        }
    }
}

impl Default for SidecarBridge {
    fn default() -> Self {
        Self::new(SidecarConfig::default())
    }
}

#[async_trait]
impl ProcessBridge for SidecarBridge {
    async fn launch(&self, config: &NodeConfig) -> Result<(), BridgeError> {
        let mut slot = self.node.lock().await;
        if slot.as_ref().is_some_and(RunningNode::is_alive) {
            return Err(BridgeError::AlreadyRunning);
        }
        if let Some(stale) = slot.take() {
            let _ = stale.stop().await;
        }

        let rpc = NodeRpc::local(config.http_port, self.cfg.rpc_timeout_clamped())
            .map(Arc::new)
            .map_err(|e| BridgeError::rejected(format!("rpc client: {e}")))?;
        let mut child = self.command(config).spawn().map_err(BridgeError::Spawn)?;
        let pid = child.id().unwrap_or_default();
        tracing::info!(pid, binary = %self.cfg.binary.display(), "node spawned");

        let token = CancellationToken::new();
        let board = SharedBoard::default();
        let mut workers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            workers.push(tokio::spawn(read_reports(
                stdout,
                Arc::clone(&board),
                token.clone(),
            )));
        }

        if let Err(e) = self.wait_ready(&rpc, &mut child).await {
            token.cancel();
            if let Err(kill) = child.kill().await {
                tracing::warn!(pid, error = %kill, "failed to kill node after failed launch");
            }
            return Err(e);
        }

        let alive = Arc::new(AtomicBool::new(true));
        let hung = CancellationToken::new();
        let exit = tokio::spawn(watch_exit(
            child,
            pid,
            Arc::clone(&rpc),
            Arc::clone(&alive),
            self.bus.clone(),
            token.clone(),
            hung.clone(),
        ));
        let stats = StatsLoop {
            pid,
            board,
            bus: self.bus.clone(),
            rpc: Arc::clone(&rpc),
            every: self.cfg.stats_interval_clamped(),
            unresponsive_limit: self.cfg.liveness_threshold(),
        };
        workers.push(tokio::spawn(stats.run(token.clone(), hung)));

        *slot = Some(RunningNode {
            pid,
            rpc,
            alive,
            token,
            exit,
            workers,
        });
        tracing::info!(pid, port = config.http_port, "node ready");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        let mut slot = self.node.lock().await;
        let node = slot.take().ok_or(BridgeError::NotRunning)?;
        if !node.is_alive() {
            let _ = node.stop().await;
            return Err(BridgeError::NotRunning);
        }
        let pid = node.pid;
        node.stop().await?;
        tracing::info!(pid, "node stopped");
        Ok(())
    }

    fn bus(&self) -> &Bus {
        &self.bus
    }
}

async fn until_answered(rpc: &NodeRpc, every: Duration) {
    loop {
        match rpc.client_version().await {
            Ok(version) => {
                tracing::debug!(%version, "node answered");
                return;
            }
            Err(e) => tracing::debug!(endpoint = rpc.endpoint(), error = %e, "node not ready"),
        }
        time::sleep(every).await;
    }
}

async fn watch_exit(
    mut child: Child,
    pid: u32,
    rpc: Arc<NodeRpc>,
    alive: Arc<AtomicBool>,
    bus: Bus,
    token: CancellationToken,
    hung: CancellationToken,
) -> io::Result<()> {
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            let res = child.kill().await;
            alive.store(false, Ordering::SeqCst);
            res
        }
        _ = hung.cancelled() => {
            let res = child.kill().await;
            alive.store(false, Ordering::SeqCst);
            token.cancel();
            tracing::warn!(pid, "node stopped answering rpc, killed");
            bus.publish(Event::crashed().with_reason("node stopped answering RPC"));
            res
        }
        status = child.wait() => {
            alive.store(false, Ordering::SeqCst);
            token.cancel();
            let reason = describe_exit(status);
            tracing::warn!(pid, %reason, "node exited unexpectedly");
            bus.publish(Event::crashed().with_reason(reason));
            Ok(())
        }
    }
}

fn describe_exit(status: io::Result<std::process::ExitStatus>) -> String {
    match status {
        Ok(status) => status.to_string(),
        Err(e) => format!("wait failed: {e}"),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bridge::StatsPayload;
    use crate::events::EventKind;
    use crate::testing::{RpcStub, WAIT};
    use serde_json::json;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;
    use tokio::sync::broadcast;
    use tokio::time::timeout;

    const REPORT: &str = "INFO trin_history: reports~ data: radius=7% content=1.5/2000mb #=9 \
        disk=4.0mb; msgs: offers=1/1, accepts=1/1, validations=1/1";

    /// Runs `script` through `sh -c`; the node flags land in `$0..$n` and are ignored.
    fn scripted(script: &str) -> SidecarConfig {
        SidecarConfig {
            binary: "/bin/sh".into(),
            launcher_args: vec!["-c".into(), script.into()],
            readiness_timeout: Duration::ZERO,
            stats_interval: Duration::from_millis(20),
            ready_poll_interval: Duration::from_millis(20),
            rpc_timeout: Duration::from_millis(200),
            unresponsive_limit: 0,
            ..SidecarConfig::default()
        }
    }

    async fn free_port() -> u16 {
        let l = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        l.local_addr().unwrap().port()
    }

    async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
        timeout(WAIT, async {
            loop {
                let ev = rx.recv().await.unwrap();
                if ev.kind == kind {
                    return ev;
                }
            }
        })
        .await
        .unwrap()
    }

    #[test]
    fn node_args_follow_config() {
        let bridge = SidecarBridge::default();
        let cfg = NodeConfig {
            http_port: 9000,
            storage: 500,
            ..NodeConfig::default()
        };
        assert_eq!(
            bridge.node_args(&cfg),
            vec![
                "--web3-transport=http",
                "--portal-subnetworks=history,state,beacon",
                "--web3-http-address=http://127.0.0.1:9000",
                "--mb=500",
            ]
        );

        let rooted = NodeConfig {
            trusted_checkpoint_root: "0xabcdef".into(),
            ..cfg
        };
        assert!(
            bridge
                .node_args(&rooted)
                .contains(&"--trusted-block-root=0xabcdef".to_string())
        );
    }

    #[tokio::test]
    async fn running_node_reports_parsed_stats() {
        let script = format!("echo '{REPORT}'; exec sleep 30");
        let bridge = SidecarBridge::new(scripted(&script));
        let mut rx = bridge.bus().subscribe();

        bridge.launch(&NodeConfig::default()).await.unwrap();
        let pid = bridge.pid().await.unwrap();

        let stats = timeout(WAIT, async {
            loop {
                let ev = next_of(&mut rx, EventKind::NodeStats).await;
                if let Some(StatsPayload::Tri(s)) = ev.stats.as_deref() {
                    if s.history_data.radius == 7.0 {
                        return s.clone();
                    }
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(stats.pid, pid);
        assert_eq!(stats.history_data.count, 9);

        bridge.shutdown().await.unwrap();
        assert_eq!(bridge.pid().await, None);
    }

    #[tokio::test]
    async fn second_launch_is_rejected_while_alive() {
        let bridge = SidecarBridge::new(scripted("exec sleep 30"));
        bridge.launch(&NodeConfig::default()).await.unwrap();

        let err = bridge.launch(&NodeConfig::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::AlreadyRunning));
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unexpected_exit_publishes_crash_and_allows_relaunch() {
        let bridge = SidecarBridge::new(scripted("sleep 0.1; exit 3"));
        let mut rx = bridge.bus().subscribe();
        bridge.launch(&NodeConfig::default()).await.unwrap();

        let ev = next_of(&mut rx, EventKind::NodeCrashed).await;
        assert!(ev.reason.as_deref().unwrap().contains('3'));

        bridge.launch(&NodeConfig::default()).await.unwrap();
        next_of(&mut rx, EventKind::NodeCrashed).await;
        let err = bridge.shutdown().await.unwrap_err();
        assert!(matches!(err, BridgeError::NotRunning));
    }

    #[tokio::test]
    async fn requested_shutdown_is_not_a_crash() {
        let bridge = SidecarBridge::new(scripted("exec sleep 30"));
        let mut rx = bridge.bus().subscribe();
        bridge.launch(&NodeConfig::default()).await.unwrap();

        bridge.shutdown().await.unwrap();

        while let Ok(ev) = rx.try_recv() {
            assert_ne!(ev.kind, EventKind::NodeCrashed);
        }
    }

    #[tokio::test]
    async fn shutdown_without_child_fails() {
        let bridge = SidecarBridge::default();
        let err = bridge.shutdown().await.unwrap_err();
        assert!(matches!(err, BridgeError::NotRunning));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let bridge = SidecarBridge::new(SidecarConfig {
            binary: "/nonexistent/trin".into(),
            ..SidecarConfig::default()
        });
        let err = bridge.launch(&NodeConfig::default()).await.unwrap_err();
        assert_eq!(err.as_label(), "bridge_spawn");
    }

    #[tokio::test]
    async fn silent_rpc_port_times_out() {
        let bridge = SidecarBridge::new(SidecarConfig {
            readiness_timeout: Duration::from_millis(200),
            ..scripted("exec sleep 30")
        });
        let cfg = NodeConfig {
            http_port: free_port().await,
            ..NodeConfig::default()
        };

        let err = bridge.launch(&cfg).await.unwrap_err();

        assert!(matches!(err, BridgeError::Unresponsive { .. }));
        assert_eq!(bridge.pid().await, None);
    }

    #[tokio::test]
    async fn port_without_rpc_is_not_ready() {
        // Accepts connections through the backlog but never answers a request.
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let bridge = SidecarBridge::new(SidecarConfig {
            readiness_timeout: Duration::from_millis(300),
            rpc_timeout: Duration::from_millis(100),
            ..scripted("exec sleep 30")
        });
        let cfg = NodeConfig {
            http_port: listener.local_addr().unwrap().port(),
            ..NodeConfig::default()
        };

        let err = bridge.launch(&cfg).await.unwrap_err();

        assert!(matches!(err, BridgeError::Unresponsive { .. }));
        assert_eq!(bridge.pid().await, None);
    }

    fn answering(stub: &RpcStub) -> NodeConfig {
        stub.answer("web3_clientVersion", json!("trin/v0.1.0"));
        NodeConfig {
            http_port: stub.port(),
            ..NodeConfig::default()
        }
    }

    #[tokio::test]
    async fn answering_node_completes_launch() {
        let stub = RpcStub::start().await;
        let cfg = answering(&stub);
        let bridge = SidecarBridge::new(SidecarConfig {
            readiness_timeout: WAIT,
            ..scripted("exec sleep 30")
        });

        bridge.launch(&cfg).await.unwrap();

        assert!(
            stub.requests()
                .iter()
                .any(|r| r["method"] == "web3_clientVersion")
        );
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn chain_heads_come_from_rpc() {
        let stub = RpcStub::start().await;
        let cfg = answering(&stub);
        stub.answer(
            "portal_beaconFinalityUpdate",
            json!({ "finalized_header": { "execution": { "block_number": "0x64" } } }),
        );
        stub.answer(
            "portal_beaconOptimisticUpdate",
            json!({ "attested_header": { "execution": { "block_number": 101 } } }),
        );
        let bridge = SidecarBridge::new(SidecarConfig {
            unresponsive_limit: 3,
            ..scripted("exec sleep 30")
        });
        let mut rx = bridge.bus().subscribe();

        bridge.launch(&cfg).await.unwrap();
        let ev = next_of(&mut rx, EventKind::NodeStats).await;
        let Some(StatsPayload::Tri(stats)) = ev.stats.as_deref() else {
            panic!("expected tri stats, got {ev:?}");
        };
        assert_eq!(stats.latest_finalized_block, Some(100));
        assert_eq!(stats.latest_optimistic_block, Some(101));

        bridge.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unanswered_rpc_is_reported_as_crash() {
        let stub = RpcStub::start().await;
        let cfg = answering(&stub);
        let bridge = SidecarBridge::new(SidecarConfig {
            readiness_timeout: WAIT,
            unresponsive_limit: 2,
            ..scripted("exec sleep 30")
        });
        let mut rx = bridge.bus().subscribe();
        bridge.launch(&cfg).await.unwrap();

        stub.forget("web3_clientVersion");
        let ev = next_of(&mut rx, EventKind::NodeCrashed).await;

        assert!(ev.reason.as_deref().unwrap().contains("RPC"));
        assert_eq!(bridge.pid().await, None);
        assert!(bridge.rpc().await.is_none());

        stub.answer("web3_clientVersion", json!("trin/v0.1.0"));
        bridge.launch(&cfg).await.unwrap();
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn rpc_accessor_serves_block_lookups() {
        let stub = RpcStub::start().await;
        let cfg = answering(&stub);
        stub.answer("eth_getBlockByNumber", json!({ "number": "0x2a" }));
        let bridge = SidecarBridge::new(scripted("exec sleep 30"));
        assert!(bridge.rpc().await.is_none());

        bridge.launch(&cfg).await.unwrap();
        let rpc = bridge.rpc().await.unwrap();

        assert_eq!(rpc.endpoint(), format!("http://127.0.0.1:{}", stub.port()));
        let block = rpc.block_by_number(42, false).await.unwrap();
        assert_eq!(block, Some(json!({ "number": "0x2a" })));
        bridge.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn exit_during_startup_is_rejected() {
        let bridge = SidecarBridge::new(SidecarConfig {
            readiness_timeout: WAIT,
            ..scripted("exit 1")
        });
        let cfg = NodeConfig {
            http_port: free_port().await,
            ..NodeConfig::default()
        };

        let err = bridge.launch(&cfg).await.unwrap_err();
        assert_eq!(err.as_label(), "bridge_rejected");
        assert!(err.to_string().contains("exited during startup"));
    }
}
