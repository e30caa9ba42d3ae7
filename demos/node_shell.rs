//! # Example: node_shell
//!
//! Runs the full shell against a real node binary.
//!
//! Shows how to:
//! - Persist the configuration with [`JsonFileStore`].
//! - Run the node through [`SidecarBridge`].
//! - Receive user notifications through [`ChannelNotifier`].
//! - Follow the telemetry snapshot until Ctrl-C.
//! - Ask the running node for its version over JSON-RPC.
//!
//! ## Flow
//! ```text
//! Shell::start() ──► ConfigState::initialize() (config.json in <data-dir>)
//!     └─► ProcessSupervisor::toggle() ──► SidecarBridge::launch()
//!                                            ├─► NodeStats   ──► TelemetryState ──► printed
//!                                            └─► NodeCrashed ──► restart + notification
//! Ctrl-C ──► ProcessSupervisor::shutdown() ──► Shell::stop()
//! ```
//!
//! ## Run
//! ```bash
//! TRIN_BIN=/path/to/trin RUST_LOG=info cargo run --example node_shell -- ./trinvisor-data
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use trinvisor::format::{format_memory_ratio, format_memory_size};
use trinvisor::sidecar::{DesktopAutostart, SidecarBridge, SidecarConfig};
use trinvisor::{
    Autostart, CONFIG_STORE_ID, ChannelNotifier, JsonFileStore, NoopAutostart, ShellBuilder,
    ProcessBridge,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("trinvisor-data"));
    let store = JsonFileStore::open(&data_dir, CONFIG_STORE_ID).await?;
    println!("[demo] settings: {}", store.path().display());

    let mut sidecar = SidecarConfig::default();
    if let Some(bin) = std::env::var_os("TRIN_BIN") {
        sidecar.binary = bin.into();
    }
    let bridge = Arc::new(SidecarBridge::new(sidecar));

    let autostart: Arc<dyn Autostart> = match DesktopAutostart::for_user(
        "trin-desktop",
        std::env::current_exe()?,
    ) {
        Ok(desktop) => Arc::new(desktop),
        Err(_) => Arc::new(NoopAutostart),
    };
    let (notifier, mut notes) = ChannelNotifier::new();

    let shell = ShellBuilder::new(Arc::clone(&bridge) as Arc<dyn ProcessBridge>, Arc::new(store))
        .with_autostart(autostart)
        .with_notifier(Arc::new(notifier))
        .build();

    let cfg = shell.start().await?;
    println!(
        "[demo] config: port={} storage={} autostart={}",
        cfg.http_port,
        format_memory_size(cfg.storage as f64),
        cfg.autostart
    );

    shell.supervisor().toggle().await;
    if let Some(rpc) = bridge.rpc().await {
        match rpc.client_version().await {
            Ok(version) => println!("[demo] node {version} at {}", rpc.endpoint()),
            Err(e) => println!("[demo] node did not answer: {e}"),
        }
    }

    let mut telemetry = shell.telemetry().subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(n) = notes.recv() => {
                println!(
                    "[note] {}{}",
                    n.title,
                    n.description.map(|d| format!(" ({d})")).unwrap_or_default()
                );
            }
            Ok(()) = telemetry.changed() => {
                let snap = telemetry.borrow_and_update().clone();
                println!(
                    "[stats] pid={} cpu={:.1}% head={} disk={} history={} state={} beacon={}",
                    snap.pid,
                    snap.cpu,
                    snap.latest_finalized_block.map_or("-".to_string(), |b| b.to_string()),
                    format_memory_size(snap.disk_usage_mb),
                    format_memory_ratio(snap.history.content_current, snap.history.content_total),
                    format_memory_ratio(snap.state.content_current, snap.state.content_total),
                    format_memory_ratio(snap.beacon.content_current, snap.beacon.content_total),
                );
            }
        }
    }

    if shell.supervisor().status() == trinvisor::ProcessStatus::Running {
        shell.supervisor().shutdown().await;
    }
    shell.stop().await;
    Ok(())
}
