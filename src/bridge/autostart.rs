//! # OS-level autostart registration.
//!
//! [`Autostart`] toggles whether the desktop application is launched at login.
//! [`NoopAutostart`] accepts every request and registers nothing.

use async_trait::async_trait;

use crate::error::BridgeError;

/// Enables or disables launch-at-login for the hosting application.
#[async_trait]
pub trait Autostart: Send + Sync + 'static {
    async fn enable(&self) -> Result<(), BridgeError>;

    async fn disable(&self) -> Result<(), BridgeError>;

    /// Enables when `on` is true, disables otherwise.
    async fn set_enabled(&self, on: bool) -> Result<(), BridgeError> {
        if on {
            self.enable().await
        } else {
            self.disable().await
        }
    }
}

/// Autostart capability for hosts without a registration mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAutostart;

#[async_trait]
impl Autostart for NoopAutostart {
    async fn enable(&self) -> Result<(), BridgeError> {
        tracing::debug!("autostart enable ignored (no registration backend)");
        Ok(())
    }

    async fn disable(&self) -> Result<(), BridgeError> {
        tracing::debug!("autostart disable ignored (no registration backend)");
        Ok(())
    }
}
