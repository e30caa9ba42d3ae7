//! # User-facing notifications.
//!
//! Every failure in the shell ends up as exactly one [`Notification`] (title, optional
//! description, [`Severity`]). Delivery is fire-and-forget: a [`Notifier`] never reports
//! back and nothing tracks acknowledgment.
//!
//! ## Built-in notifiers
//! - [`ChannelNotifier`] forwards into an unbounded channel drained by the presentation layer
//! - [`LogNotifier`] renders notifications as `tracing` records

use std::fmt;

use tokio::sync::mpsc;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Normal,
    Destructive,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

impl Notification {
    /// Normal notification with a title only.
    pub fn normal(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Normal,
        }
    }

    /// Destructive notification with a title only.
    pub fn destructive(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity: Severity::Destructive,
        }
    }

    /// Destructive notification describing a failed operation: `Error: <err>`.
    pub fn failure(title: impl Into<String>, err: &dyn fmt::Display) -> Self {
        Self::destructive(title).with_description(format!("Error: {err}"))
    }

    #[inline]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[inline]
    pub fn is_destructive(&self) -> bool {
        matches!(self.severity, Severity::Destructive)
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Creates the notifier and the receiving end for the presentation layer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped: receiver closed");
        }
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        let description = n.description.as_deref().unwrap_or("");
        match n.severity {
            Severity::Destructive => tracing::warn!(title = %n.title, %description, "notification"),
            Severity::Normal => tracing::info!(title = %n.title, %description, "notification"),
        }
    }
}
