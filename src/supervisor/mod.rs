//! Node process supervision.
//!
//! - [`ProcessSupervisor`] launch / shutdown / toggle and crash recovery
//! - [`ProcessStatus`], [`ProcessState`] the observable state

mod crash;
mod status;
mod supervisor;

pub use status::{ProcessState, ProcessStatus};
pub use supervisor::ProcessSupervisor;
