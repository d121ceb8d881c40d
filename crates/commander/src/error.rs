//! Commander error types.

use common::OrderId;
use domain::Step;
use queue_store::QueueStoreError;
use thiserror::Error;

/// The closed, caller-visible failure taxonomy for a service call.
///
/// Any error a concrete service wants to report must declare itself as one
/// of the two: retryable or not. The commander never inspects reasons, only
/// the variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    /// Non-retryable business-rule rejection; aborts the whole order.
    #[error("Permanent failure: {reason}")]
    Permanent { reason: String },

    /// Retryable infrastructure unavailability; absorbed by the retry
    /// budget and the queue.
    #[error("Transient failure: {reason}")]
    Transient { reason: String },
}

impl StepFailure {
    /// Creates a permanent failure.
    pub fn permanent(reason: impl Into<String>) -> Self {
        StepFailure::Permanent {
            reason: reason.into(),
        }
    }

    /// Creates a transient failure.
    pub fn transient(reason: impl Into<String>) -> Self {
        StepFailure::Transient {
            reason: reason.into(),
        }
    }

    /// The backing store of a service is temporarily unavailable.
    pub fn database_unavailable() -> Self {
        Self::transient("database unavailable")
    }

    /// The ordered item is out of stock.
    pub fn item_unavailable() -> Self {
        Self::permanent("item unavailable")
    }

    /// Shipping to the user's destination is not possible.
    pub fn shipping_not_possible() -> Self {
        Self::permanent("shipping not possible")
    }

    /// Returns true for the retryable variant.
    pub fn is_transient(&self) -> bool {
        matches!(self, StepFailure::Transient { .. })
    }

    /// Returns true for the non-retryable variant.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StepFailure::Permanent { .. })
    }
}

/// Terminal diagnostic explaining why an order failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFailure {
    /// A step was rejected by a business rule.
    #[error("Step '{step}' failed permanently: {reason}")]
    Permanent { step: Step, reason: String },

    /// A queued step exceeded its absolute deadline.
    #[error("Step '{step}' exceeded its deadline after {elapsed_ms}ms")]
    DeadlineExceeded { step: Step, elapsed_ms: i64 },
}

impl OrderFailure {
    /// Returns the step the order failed on.
    pub fn step(&self) -> Step {
        match self {
            OrderFailure::Permanent { step, .. } => *step,
            OrderFailure::DeadlineExceeded { step, .. } => *step,
        }
    }
}

/// Errors surfaced by the commander API itself.
#[derive(Debug, Error)]
pub enum CommanderError {
    /// The order has already been placed with this commander.
    #[error("Order already placed: {0}")]
    DuplicateOrder(OrderId),

    /// No order with this ID is known to the commander.
    #[error("Unknown order: {0}")]
    UnknownOrder(OrderId),

    /// Queue store error.
    #[error("Queue store error: {0}")]
    QueueStore(#[from] QueueStoreError),
}

/// Convenience type alias for commander results.
pub type Result<T> = std::result::Result<T, CommanderError>;
