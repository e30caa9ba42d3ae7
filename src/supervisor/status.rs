//! Run status of the supervised node.

use serde::Serialize;

/// Whether the node is believed to be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    #[default]
    Stopped,
    Running,
}

impl ProcessStatus {
    /// The status a successful toggle leads to.
    pub fn toggled(self) -> Self {
        match self {
            ProcessStatus::Stopped => ProcessStatus::Running,
            ProcessStatus::Running => ProcessStatus::Stopped,
        }
    }
}

/// Observable supervisor state.
///
/// `launching` is true while a launch or shutdown request is in flight. It describes
/// the request, it does not block a concurrent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProcessState {
    pub status: ProcessStatus,
    pub launching: bool,
}
