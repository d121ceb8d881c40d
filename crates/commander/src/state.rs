//! Per-step state machine.

use serde::{Deserialize, Serialize};

/// The state of one `(order, step)` pair.
///
/// State transitions:
/// ```text
/// NotStarted ──► Attempting ──┬──► Succeeded
///                    ▲        ├──► PermanentlyFailed
///                    │        └──► Queued ──► Attempting
///                    │                │
///                    └────────────────┴──► Abandoned (deadline exceeded)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StepState {
    /// The step has not been attempted yet.
    #[default]
    NotStarted,

    /// A retry cycle is running against the service.
    Attempting,

    /// The service call succeeded (terminal state).
    Succeeded,

    /// Immediate retries were exhausted; a task is waiting in the queue.
    Queued,

    /// The service rejected the step with a business-rule error
    /// (terminal state).
    PermanentlyFailed,

    /// The queued task outlived its absolute deadline (terminal state).
    Abandoned,
}

impl StepState {
    /// Returns true if an attempt cycle may start from this state.
    pub fn can_attempt(&self) -> bool {
        matches!(self, StepState::NotStarted | StepState::Queued)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Succeeded | StepState::PermanentlyFailed | StepState::Abandoned
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::NotStarted => "NotStarted",
            StepState::Attempting => "Attempting",
            StepState::Succeeded => "Succeeded",
            StepState::Queued => "Queued",
            StepState::PermanentlyFailed => "PermanentlyFailed",
            StepState::Abandoned => "Abandoned",
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
