//! Test doubles for the bridge, autostart, store and notification collaborators.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Semaphore, mpsc};

use crate::bridge::{Autostart, ProcessBridge};
use crate::config::NodeConfig;
use crate::error::{BridgeError, StoreError};
use crate::events::Bus;
use crate::notify::{Notification, Notifier};
use crate::store::{ConfigStore, MemoryStore};

/// Upper bound for any wait in tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// A call observed by [`ScriptedBridge`], reported when the call starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Launch(NodeConfig),
    Shutdown,
}

/// Bridge with programmable results.
///
/// Results are popped from per-operation queues; an empty queue means success.
/// A gated bridge blocks every call until [`ScriptedBridge::release`] is called.
pub struct ScriptedBridge {
    bus: Bus,
    launch_results: Mutex<VecDeque<Result<(), BridgeError>>>,
    shutdown_results: Mutex<VecDeque<Result<(), BridgeError>>>,
    launches: AtomicUsize,
    shutdowns: AtomicUsize,
    gate: Option<Semaphore>,
    calls_tx: mpsc::UnboundedSender<Call>,
    calls_rx: Mutex<Option<mpsc::UnboundedReceiver<Call>>>,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        Self {
            bus: Bus::new(64),
            launch_results: Mutex::new(VecDeque::new()),
            shutdown_results: Mutex::new(VecDeque::new()),
            launches: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            gate,
            calls_tx,
            calls_rx: Mutex::new(Some(calls_rx)),
        }
    }

    pub fn fail_next_launch(&self, error: &str) {
        self.launch_results
            .lock()
            .unwrap()
            .push_back(Err(BridgeError::rejected(error)));
    }

    pub fn fail_next_shutdown(&self, error: &str) {
        self.shutdown_results
            .lock()
            .unwrap()
            .push_back(Err(BridgeError::rejected(error)));
    }

    /// Lets one blocked call complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Receiver of call notifications; can be taken once.
    pub fn calls(&self) -> mpsc::UnboundedReceiver<Call> {
        self.calls_rx
            .lock()
            .unwrap()
            .take()
            .expect("calls receiver already taken")
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl ProcessBridge for ScriptedBridge {
    async fn launch(&self, config: &NodeConfig) -> Result<(), BridgeError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let _ = self.calls_tx.send(Call::Launch(config.clone()));
        self.pass_gate().await;
        let next = self.launch_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        let _ = self.calls_tx.send(Call::Shutdown);
        self.pass_gate().await;
        let next = self.shutdown_results.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    fn bus(&self) -> &Bus {
        &self.bus
    }
}

/// Autostart double that records requests and optionally fails them.
#[derive(Default)]
pub struct ScriptedAutostart {
    requests: Mutex<Vec<bool>>,
    fail_with: Mutex<Option<String>>,
}

impl ScriptedAutostart {
    pub fn failing(error: &str) -> Self {
        let a = Self::default();
        *a.fail_with.lock().unwrap() = Some(error.to_string());
        a
    }

    pub fn requests(&self) -> Vec<bool> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, on: bool) -> Result<(), BridgeError> {
        self.requests.lock().unwrap().push(on);
        match self.fail_with.lock().unwrap().clone() {
            Some(error) => Err(BridgeError::Autostart { error }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Autostart for ScriptedAutostart {
    async fn enable(&self) -> Result<(), BridgeError> {
        self.record(true)
    }

    async fn disable(&self) -> Result<(), BridgeError> {
        self.record(false)
    }
}

/// Memory store that fails writes to one chosen key, or every read.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_set_on: Option<&'static str>,
    fail_get: bool,
}

impl FlakyStore {
    pub fn failing_set(key: &'static str) -> Self {
        Self {
            fail_set_on: Some(key),
            ..Self::default()
        }
    }

    pub fn failing_get() -> Self {
        Self {
            fail_get: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ConfigStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        if self.fail_get {
            return Err(StoreError::Unavailable {
                error: "disk unavailable".into(),
            });
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.fail_set_on == Some(key) {
            return Err(StoreError::Unavailable {
                error: format!("cannot write {key}"),
            });
        }
        self.inner.set(key, value).await
    }
}

/// Notifier that keeps everything it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.title).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[cfg(feature = "sidecar")]
pub use rpc_stub::RpcStub;

#[cfg(feature = "sidecar")]
mod rpc_stub {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[derive(Default)]
    struct Script {
        answers: HashMap<String, Value>,
        requests: Vec<Value>,
    }

    /// Local HTTP JSON-RPC server with scripted results.
    ///
    /// Methods without an answer get a `-32601` error object.
    pub struct RpcStub {
        port: u16,
        script: Arc<Mutex<Script>>,
        task: JoinHandle<()>,
    }

    impl RpcStub {
        pub async fn start() -> Self {
            let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let script = Arc::new(Mutex::new(Script::default()));
            let shared = Arc::clone(&script);
            let task = tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, Arc::clone(&shared)));
                }
            });
            Self { port, script, task }
        }

        pub fn port(&self) -> u16 {
            self.port
        }

        pub fn answer(&self, method: &str, result: Value) {
            let mut script = self.script.lock().unwrap();
            script.answers.insert(method.to_string(), result);
        }

        pub fn forget(&self, method: &str) {
            self.script.lock().unwrap().answers.remove(method);
        }

        /// Every request body received so far, oldest first.
        pub fn requests(&self) -> Vec<Value> {
            self.script.lock().unwrap().requests.clone()
        }
    }

    impl Drop for RpcStub {
        fn drop(&mut self) {
            self.task.abort();
        }
    }

    async fn serve(mut stream: TcpStream, script: Arc<Mutex<Script>>) {
        while let Some(request) = read_request(&mut stream).await {
            let body = reply(&script, request).to_string();
            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
                body.len()
            );
            if stream.write_all(head.as_bytes()).await.is_err()
                || stream.write_all(body.as_bytes()).await.is_err()
            {
                return;
            }
        }
    }

    async fn read_request(stream: &mut TcpStream) -> Option<Value> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let body_start = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        };
        let head = String::from_utf8_lossy(&buf[..body_start]).to_ascii_lowercase();
        let len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < body_start + len {
            let n = stream.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        serde_json::from_slice(&buf[body_start..body_start + len]).ok()
    }

    fn reply(script: &Mutex<Script>, request: Value) -> Value {
        let mut script = script.lock().unwrap();
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request["method"].as_str().unwrap_or_default().to_string();
        script.requests.push(request);
        match script.answers.get(&method) {
            Some(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            None => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("method {method} not found") }
            }),
        }
    }
}
