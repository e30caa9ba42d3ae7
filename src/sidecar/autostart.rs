//! # Launch-at-login through an XDG autostart entry.
//!
//! Desktop sessions following the XDG autostart convention start every `*.desktop` file found in
//! `$XDG_CONFIG_HOME/autostart` (falling back to `~/.config/autostart`) at login.
//! [`DesktopAutostart`] writes that file on `enable` and removes it on `disable`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::bridge::Autostart;
use crate::error::BridgeError;

/// [`Autostart`] backed by a `.desktop` entry.
#[derive(Debug, Clone)]
pub struct DesktopAutostart {
    app_name: String,
    exec: PathBuf,
    entry: PathBuf,
}

impl DesktopAutostart {
    /// Entry under `<config_dir>/autostart/<app_name>.desktop`.
    pub fn in_config_dir(
        config_dir: impl AsRef<Path>,
        app_name: impl Into<String>,
        exec: impl Into<PathBuf>,
    ) -> Self {
        let app_name = app_name.into();
        let entry = config_dir
            .as_ref()
            .join("autostart")
            .join(format!("{app_name}.desktop"));
        Self {
            app_name,
            exec: exec.into(),
            entry,
        }
    }

    /// Entry under the user's XDG config directory.
    ///
    /// Fails with [`BridgeError::Unsupported`] when neither `XDG_CONFIG_HOME` nor `HOME` is set.
    pub fn for_user(
        app_name: impl Into<String>,
        exec: impl Into<PathBuf>,
    ) -> Result<Self, BridgeError> {
        let config_dir = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .ok_or(BridgeError::Unsupported {
                operation: "autostart",
            })?;
        Ok(Self::in_config_dir(config_dir, app_name, exec))
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry
    }

    /// Whether the entry currently exists.
    pub async fn is_enabled(&self) -> bool {
        tokio::fs::try_exists(&self.entry).await.unwrap_or(false)
    }

    fn contents(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Version=1.0\n\
             Name={name}\n\
             Comment={name} startup script\n\
             Exec={exec}\n\
             StartupNotify=false\n\
             Terminal=false\n",
            name = self.app_name,
            exec = self.exec.display(),
        )
    }
}

fn registration_failed(e: io::Error) -> BridgeError {
    BridgeError::Autostart {
        error: e.to_string(),
    }
}

#[async_trait]
impl Autostart for DesktopAutostart {
    async fn enable(&self) -> Result<(), BridgeError> {
        if let Some(dir) = self.entry.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(registration_failed)?;
        }
        tokio::fs::write(&self.entry, self.contents())
            .await
            .map_err(registration_failed)?;
        tracing::info!(entry = %self.entry.display(), "autostart enabled");
        Ok(())
    }

    async fn disable(&self) -> Result<(), BridgeError> {
        match tokio::fs::remove_file(&self.entry).await {
            Ok(()) => {
                tracing::info!(entry = %self.entry.display(), "autostart disabled");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(registration_failed(e)),
        }
    }
}
