//! # Standing subscription with an explicit lifecycle.
//!
//! [`Subscription::spawn`] attaches a [`Subscribe`] handler to a [`Bus`] and returns a
//! handle that owns the worker task.
//!
//! ## Architecture
//! ```text
//! Bus ──► broadcast::Receiver ──► worker task ──► subscriber.on_event()
//!                                     │                └─► panic → logged, continue
//!                                     └─► token cancelled / bus closed → exit
//! ```
//!
//! ## Rules
//! - The receiver is created inside `spawn`, so every event published after `spawn`
//!   returns is observed.
//! - `stop()` cancels the worker and waits for it; an in-flight handler runs to completion.
//! - Dropping the handle cancels the worker without waiting.
//! - A lagging receiver logs the number of skipped events and continues.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Subscribe;
use crate::events::{Bus, Event};

/// Handle to a running subscription worker.
pub struct Subscription {
    name: &'static str,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Attaches `sub` to `bus` and starts delivering events.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(bus: &Bus, sub: Arc<dyn Subscribe>) -> Self {
        let name = sub.name();
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let worker_token = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                let res = tokio::select! {
                    biased;
                    _ = worker_token.cancelled() => break,
                    res = rx.recv() => res,
                };
                match res {
                    Ok(ev) => deliver(sub.as_ref(), &ev).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(subscriber = name, skipped, "subscription lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!(subscriber = name, "subscription finished");
        });

        tracing::debug!(subscriber = name, "subscription started");
        Self {
            name,
            token,
            handle: Some(handle),
        }
    }

    /// Name of the attached subscriber.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the worker is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Detaches the subscriber and waits for the worker to exit.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

async fn deliver(sub: &dyn Subscribe, ev: &Event) {
    let fut = sub.on_event(ev);
    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        let any = &*panic_err;
        let info = if let Some(msg) = any.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = any.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!(subscriber = sub.name(), seq = ev.seq, %info, "subscriber panicked");
    }
}
