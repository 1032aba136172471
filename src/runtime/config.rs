//! Per-instance configuration.

use serde::{Deserialize, Serialize};

/// How the dispatcher chooses among several eligible transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Fire the first eligible candidate in declaration order.
    #[default]
    FirstMatch,

    /// Evaluate every candidate and reject the event when more than one
    /// is eligible.
    RejectAmbiguous,
}

/// History records kept per instance unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Configuration of a machine instance.
///
/// # Example
///
/// ```rust
/// use efsm::runtime::{MachineConfig, SelectionPolicy};
///
/// let config = MachineConfig::default()
///     .with_selection(SelectionPolicy::RejectAmbiguous)
///     .with_history_limit(100);
///
/// assert_eq!(config.selection, SelectionPolicy::RejectAmbiguous);
/// assert!(config.track_history);
/// assert_eq!(config.history_limit, Some(100));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub selection: SelectionPolicy,

    /// Record every firing in the instance history
    pub track_history: bool,

    /// Keep at most this many history records (`None` keeps all)
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::FirstMatch,
            track_history: true,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

impl MachineConfig {
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_history(mut self, track: bool) -> Self {
        self.track_history = track;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Keep every firing for the lifetime of the instance.
    pub fn with_unbounded_history(mut self) -> Self {
        self.history_limit = None;
        self
    }
}
