//! # JSON-RPC client for the local node.
//!
//! [`NodeRpc`] speaks JSON-RPC 2.0 over HTTP to the node's `--web3-http-address`.
//!
//! | Method                          | Used for                                   |
//! |---------------------------------|--------------------------------------------|
//! | `web3_clientVersion`            | readiness after spawn, liveness while running |
//! | `portal_beaconFinalityUpdate`   | `latestFinalizedBlock` in stats            |
//! | `portal_beaconOptimisticUpdate` | `latestOptimisticBlock` in stats           |
//! | `eth_getBlockByNumber`          | block lookup                               |
//! | `eth_getBlockByHash`            | block lookup                               |
//!
//! Light-client updates are read leniently: the execution block number is looked up
//! under the update's header, optionally wrapped in a single fork-name key, and may be
//! a JSON number, a decimal string or a `0x` quantity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Failure of a JSON-RPC request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RpcError {
    /// The HTTP exchange failed (connection, timeout, status, body).
    #[error("rpc transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Server { code: i64, message: String },

    /// The result did not have the expected shape.
    #[error("unexpected rpc result: {0}")]
    Decode(#[source] serde_json::Error),

    /// A block hash argument is not 32 hex-encoded bytes.
    #[error("invalid block hash {0:?}")]
    InvalidHash(String),
}

impl RpcError {
    pub fn as_label(&self) -> &'static str {
        match self {
            RpcError::Transport(_) => "rpc_transport",
            RpcError::Server { .. } => "rpc_server",
            RpcError::Decode(_) => "rpc_decode",
            RpcError::InvalidHash(_) => "rpc_invalid_hash",
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// JSON-RPC client bound to one node endpoint.
#[derive(Debug)]
pub struct NodeRpc {
    client: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl NodeRpc {
    /// Client for a node listening on `127.0.0.1:<port>`.
    pub fn local(port: u16, timeout: Duration) -> Result<Self, RpcError> {
        Self::new(format!("http://127.0.0.1:{port}"), timeout)
    }

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and returns its raw `result` (`Null` when absent).
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = Request {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response: Response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Server {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    /// [`call`](Self::call) with the result decoded into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).map_err(RpcError::Decode)
    }

    pub async fn client_version(&self) -> Result<String, RpcError> {
        self.call_as("web3_clientVersion", json!([])).await
    }

    /// Whether the node answers `web3_clientVersion`.
    pub async fn is_responsive(&self) -> bool {
        match self.client_version().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "node did not answer");
                false
            }
        }
    }

    /// Execution block number of the latest finalized beacon header.
    pub async fn finalized_block(&self) -> Result<Option<u64>, RpcError> {
        let update = self.call("portal_beaconFinalityUpdate", json!([])).await?;
        Ok(execution_block_number(&update, "finalized_header"))
    }

    /// Execution block number of the latest optimistic (attested) beacon header.
    pub async fn optimistic_block(&self) -> Result<Option<u64>, RpcError> {
        let update = self.call("portal_beaconOptimisticUpdate", json!([])).await?;
        Ok(execution_block_number(&update, "attested_header"))
    }

    /// `eth_getBlockByNumber`; `None` when the node does not know the block.
    pub async fn block_by_number(
        &self,
        number: u64,
        full_transactions: bool,
    ) -> Result<Option<Value>, RpcError> {
        let block = self
            .call(
                "eth_getBlockByNumber",
                json!([format!("0x{number:x}"), full_transactions]),
            )
            .await?;
        Ok((!block.is_null()).then_some(block))
    }

    /// `eth_getBlockByHash`; the hash is checked locally before any request is sent.
    pub async fn block_by_hash(
        &self,
        hash: &str,
        full_transactions: bool,
    ) -> Result<Option<Value>, RpcError> {
        if !is_block_hash(hash) {
            return Err(RpcError::InvalidHash(hash.to_string()));
        }
        let block = self
            .call("eth_getBlockByHash", json!([hash, full_transactions]))
            .await?;
        Ok((!block.is_null()).then_some(block))
    }
}

fn is_block_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn execution_block_number(update: &Value, header: &str) -> Option<u64> {
    let found = update.get(header).or_else(|| {
        let obj = update.as_object().filter(|o| o.len() == 1)?;
        obj.values().next()?.get(header)
    })?;
    quantity(found.pointer("/execution/block_number")?)
}

fn quantity(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}
