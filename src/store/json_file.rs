//! # JSON file-backed settings store.
//!
//! [`JsonFileStore`] keeps all settings of one store identifier (e.g. `config.json`) in a
//! single JSON object on disk. Every `set` saves the whole object immediately (autosave).
//!
//! ## Rules
//! - A missing file is an empty store; the file is created on the first `set`.
//! - Writes go to `<file>.tmp` and are renamed over the target, so a crash never leaves
//!   a truncated file behind.
//! - The in-memory map is updated only after the write succeeds.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::ConfigStore;
use crate::error::StoreError;

/// Settings store persisted as one JSON object per store identifier.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Opens (or lazily creates) the store `identifier` inside `dir`.
    pub async fn open(dir: impl AsRef<Path>, identifier: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(identifier);

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Map::new(),
            Ok(bytes) => serde_json::from_slice::<Map<String, Value>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "settings store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut g = self.entries.lock().await;
        let mut next = g.clone();
        next.insert(key.to_owned(), value);
        self.save(&next).await?;
        *g = next;
        Ok(())
    }
}
