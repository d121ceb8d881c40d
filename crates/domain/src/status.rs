//! Order lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Placing ──┬──► Queued ──┬──► Completed
///           │             └──► Failed
///           ├──► Completed
///           └──► Failed
/// ```
///
/// `Queued` means at least one step exhausted its immediate retries and is
/// awaiting the background worker; the final outcome is then observable only
/// through this status, not through the original placement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// The foreground placement path is stepping through the services.
    #[default]
    Placing,

    /// One or more steps are waiting in the retry queue.
    Queued,

    /// All four steps succeeded (terminal state).
    Completed,

    /// A step failed permanently or exceeded its deadline (terminal state).
    Failed,
}

impl OrderStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Failed)
    }

    /// Returns true if steps may still be attempted in this state.
    pub fn can_attempt(&self) -> bool {
        matches!(self, OrderStatus::Placing | OrderStatus::Queued)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placing => "Placing",
            OrderStatus::Queued => "Queued",
            OrderStatus::Completed => "Completed",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_placing() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Placing.is_terminal());
        assert!(!OrderStatus::Queued.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn test_can_attempt() {
        assert!(OrderStatus::Placing.can_attempt());
        assert!(OrderStatus::Queued.can_attempt());
        assert!(!OrderStatus::Completed.can_attempt());
        assert!(!OrderStatus::Failed.can_attempt());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Placing.to_string(), "Placing");
        assert_eq!(OrderStatus::Queued.to_string(), "Queued");
        assert_eq!(OrderStatus::Completed.to_string(), "Completed");
        assert_eq!(OrderStatus::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_serialization() {
        let status = OrderStatus::Queued;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
