//! Error types used by the node shell.
//!
//! This module defines three error enums:
//!
//! - [`BridgeError`]: failures of process bridge operations (launch, shutdown, autostart).
//! - [`StoreError`]: failures of the persisted settings store.
//! - [`ConfigError`]: failures of configuration operations, wrapping either of the above.
//!
//! All of them provide `as_label` (stable snake_case label for logs). Their `Display`
//! text is what ends up in user-facing notifications as `Error: <text>`.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the process bridge.
///
/// These represent failures of the remote operations the shell asks the bridge for.
/// None of them are fatal: callers convert them into notifications and keep going.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The bridge rejected the request; `error` is the remote error text.
    #[error("{error}")]
    Rejected {
        /// The underlying error message.
        error: String,
    },

    /// The node binary could not be spawned.
    #[error("failed to spawn node: {0}")]
    Spawn(#[source] std::io::Error),

    /// The running node could not be stopped.
    #[error("failed to stop node: {0}")]
    Kill(#[source] std::io::Error),

    /// A launch was requested while a node process is alive.
    #[error("node is already running")]
    AlreadyRunning,

    /// A shutdown was requested while no node process is alive.
    #[error("node is not running")]
    NotRunning,

    /// The node did not answer RPC within the readiness window.
    #[error("unable to get a response from the rpc server after {timeout:?}")]
    Unresponsive {
        /// The readiness window that was exceeded.
        timeout: Duration,
    },

    /// OS-level autostart registration failed.
    #[error("autostart registration failed: {error}")]
    Autostart {
        /// The underlying error message.
        error: String,
    },

    /// The operation is not available on this host.
    #[error("{operation} is not supported on this platform")]
    Unsupported {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
}

impl BridgeError {
    /// Convenience constructor for [`BridgeError::Rejected`].
    pub fn rejected(error: impl Into<String>) -> Self {
        BridgeError::Rejected {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use trinvisor::BridgeError;
    ///
    /// let err = BridgeError::rejected("port in use");
    /// assert_eq!(err.as_label(), "bridge_rejected");
    /// assert_eq!(err.to_string(), "port in use");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BridgeError::Rejected { .. } => "bridge_rejected",
            BridgeError::Spawn(_) => "bridge_spawn",
            BridgeError::Kill(_) => "bridge_kill",
            BridgeError::AlreadyRunning => "bridge_already_running",
            BridgeError::NotRunning => "bridge_not_running",
            BridgeError::Unresponsive { .. } => "bridge_unresponsive",
            BridgeError::Autostart { .. } => "bridge_autostart",
            BridgeError::Unsupported { .. } => "bridge_unsupported",
        }
    }
}

/// # Errors produced by the settings store.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not contain a JSON object.
    #[error("store is corrupt: {0}")]
    Serde(#[from] serde_json::Error),

    /// The store refused the operation.
    #[error("store unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },
}

impl StoreError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "store_io",
            StoreError::Serde(_) => "store_serde",
            StoreError::Unavailable { .. } => "store_unavailable",
        }
    }
}

/// # Errors produced by configuration operations.
///
/// A failed configuration update may leave earlier fields written;
/// the error only reports the step that failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A store read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Enabling or disabling autostart registration failed.
    #[error(transparent)]
    Autostart(#[from] BridgeError),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use trinvisor::{ConfigError, StoreError};
    ///
    /// let err = ConfigError::from(StoreError::Unavailable { error: "locked".into() });
    /// assert_eq!(err.as_label(), "store_unavailable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Store(e) => e.as_label(),
            ConfigError::Autostart(e) => e.as_label(),
        }
    }
}
