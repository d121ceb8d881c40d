use common::{OrderId, TaskId};
use domain::Step;
use thiserror::Error;

/// Errors that can occur when interacting with the queue store.
#[derive(Debug, Error)]
pub enum QueueStoreError {
    /// The task was not found in the store.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// A task already exists for this order and step.
    /// Task existence is the mutual-exclusion marker for retry work, so a
    /// second enqueue for the same pair is always a caller bug.
    #[error("Task already queued for order {order_id}, step {step}")]
    DuplicateTask { order_id: OrderId, step: Step },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted row could not be mapped back to a task.
    #[error("Corrupt task record: {0}")]
    CorruptRecord(String),
}

/// Result type for queue store operations.
pub type Result<T> = std::result::Result<T, QueueStoreError>;
