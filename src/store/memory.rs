//! In-memory [`ConfigStore`], for embedding and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::ConfigStore;
use crate::error::StoreError;

/// Settings store backed by a `HashMap`; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            inner: Mutex::new(map),
        }
    }

    /// Returns a sorted copy of the stored keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let mut keys: Vec<String> = g.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Synchronous read, for inspection.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        let g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        g.get(key).cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut g = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        g.insert(key.to_owned(), value);
        Ok(())
    }
}
