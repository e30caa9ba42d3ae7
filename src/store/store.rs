//! # Key-value settings store.
//!
//! [`ConfigStore`] persists a small set of named JSON scalars.
//! Reading a key that was never written yields `Ok(None)`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Persistent key-value store for named settings.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}
