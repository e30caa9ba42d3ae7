//! # Settings persistence.
//!
//! - [`ConfigStore`] get/set by key, values are JSON scalars
//! - [`MemoryStore`] volatile store for embedding and tests
//! - [`JsonFileStore`] one JSON file per store identifier, autosaved on every write

mod json_file;
mod memory;
mod store;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::ConfigStore;

/// Store identifier under which the node configuration is persisted.
pub const CONFIG_STORE_ID: &str = "config.json";
