//! Node configuration: the record, partial updates and the owning state object.
//!
//! - [`NodeConfig`] the configuration passed to the bridge on launch
//! - [`ConfigPatch`] a partial update
//! - [`ConfigState`] in-memory copy synchronized with the settings store

mod node;
mod state;

pub use node::{
    ConfigKey, ConfigPatch, DEFAULT_AUTOSTART, DEFAULT_HTTP_PORT, DEFAULT_STORAGE, NodeConfig,
    UNSET_ROOT,
};
pub use state::ConfigState;
