use async_trait::async_trait;
use common::{OrderId, TaskId};
use domain::Step;

use crate::{Result, Task};

/// Core trait for retry queue implementations.
///
/// The queue provides at-least-once delivery to the background worker:
/// [`dequeue_next`](QueueStore::dequeue_next) leases a task rather than
/// removing it, and the task stays in the store until the worker observes
/// its retry succeed or abandons it past its deadline. FIFO order is
/// preserved among unleased tasks. All implementations must be thread-safe
/// (`Send + Sync`) and mutate atomically per task.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Adds a task to the back of the queue.
    ///
    /// Fails with [`DuplicateTask`](crate::QueueStoreError::DuplicateTask)
    /// if a task for the same `(order, step)` pair is already present;
    /// task existence is the at-most-one-in-flight marker.
    async fn enqueue(&self, task: Task) -> Result<TaskId>;

    /// Leases the frontmost unleased task, or returns `None` when every
    /// task is leased or the queue is empty.
    ///
    /// A leased task is invisible to further dequeues until it is
    /// [`release`](QueueStore::release)d or [`remove`](QueueStore::remove)d,
    /// which is what keeps concurrent workers off the same task.
    async fn dequeue_next(&self) -> Result<Option<Task>>;

    /// Removes a task permanently (retry succeeded or task abandoned).
    async fn remove(&self, task_id: TaskId) -> Result<()>;

    /// Records the number of queued retry cycles performed for a task.
    async fn update_attempts(&self, task_id: TaskId, attempts: u32) -> Result<()>;

    /// Returns a leased task to the back of the queue for a later cycle.
    async fn release(&self, task_id: TaskId) -> Result<()>;

    /// Returns true if a task exists for the given order and step,
    /// leased or not.
    async fn contains(&self, order_id: OrderId, step: Step) -> Result<bool>;

    /// Returns all tasks currently in the store in queue order,
    /// leased tasks included. Used for inspection and re-hydration.
    async fn pending_tasks(&self) -> Result<Vec<Task>>;

    /// Returns the number of tasks in the store, leased tasks included.
    async fn len(&self) -> Result<usize>;

    /// Returns true if the store holds no tasks at all.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
