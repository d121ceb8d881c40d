use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, TaskId};
use domain::Step;
use tokio::sync::RwLock;

use crate::{QueueStoreError, Result, Task, store::QueueStore};

#[derive(Debug, Default)]
struct QueueState {
    /// FIFO order of task IDs. Leased tasks keep their slot until released
    /// (back of the queue) or removed.
    order: VecDeque<TaskId>,
    tasks: HashMap<TaskId, Task>,
    leased: HashSet<TaskId>,
}

/// In-memory queue store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation. Not
/// durable across process restarts, but the lease and FIFO semantics are
/// identical.
#[derive(Clone, Default)]
pub struct InMemoryQueueStore {
    state: Arc<RwLock<QueueState>>,
}

impl InMemoryQueueStore {
    /// Creates a new empty in-memory queue store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all tasks and leases.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.order.clear();
        state.tasks.clear();
        state.leased.clear();
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn enqueue(&self, task: Task) -> Result<TaskId> {
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .tasks
            .values()
            .find(|t| t.order_id() == task.order_id() && t.step == task.step)
        {
            return Err(QueueStoreError::DuplicateTask {
                order_id: existing.order_id(),
                step: existing.step,
            });
        }

        let task_id = task.id;
        state.order.push_back(task_id);
        state.tasks.insert(task_id, task);
        Ok(task_id)
    }

    async fn dequeue_next(&self) -> Result<Option<Task>> {
        let mut state = self.state.write().await;

        let next = state
            .order
            .iter()
            .copied()
            .find(|id| !state.leased.contains(id));

        match next {
            Some(id) => {
                state.leased.insert(id);
                let task = state
                    .tasks
                    .get(&id)
                    .cloned()
                    .ok_or(QueueStoreError::TaskNotFound(id))?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, task_id: TaskId) -> Result<()> {
        let mut state = self.state.write().await;

        if state.tasks.remove(&task_id).is_none() {
            return Err(QueueStoreError::TaskNotFound(task_id));
        }
        state.order.retain(|id| *id != task_id);
        state.leased.remove(&task_id);
        Ok(())
    }

    async fn update_attempts(&self, task_id: TaskId, attempts: u32) -> Result<()> {
        let mut state = self.state.write().await;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or(QueueStoreError::TaskNotFound(task_id))?;
        task.attempts = attempts;
        Ok(())
    }

    async fn release(&self, task_id: TaskId) -> Result<()> {
        let mut state = self.state.write().await;

        if !state.tasks.contains_key(&task_id) {
            return Err(QueueStoreError::TaskNotFound(task_id));
        }
        state.order.retain(|id| *id != task_id);
        state.order.push_back(task_id);
        state.leased.remove(&task_id);
        Ok(())
    }

    async fn contains(&self, order_id: OrderId, step: Step) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .any(|t| t.order_id() == order_id && t.step == step))
    }

    async fn pending_tasks(&self) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks = Vec::with_capacity(state.order.len());
        for id in &state.order {
            if let Some(task) = state.tasks.get(id) {
                tasks.push(task.clone());
            }
        }
        Ok(tasks)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().await.tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, Order, User};
    use std::time::Duration;

    fn make_task(step: Step) -> Task {
        let user = User::new("Jim", "ABCD").unwrap();
        let order = Order::new(user, "book", Money::from_dollars(10)).unwrap();
        Task::new(order, step, Duration::from_secs(240))
    }

    #[tokio::test]
    async fn test_enqueue_and_dequeue_fifo() {
        let store = InMemoryQueueStore::new();
        let t1 = make_task(Step::Payment);
        let t2 = make_task(Step::Shipping);
        let id1 = t1.id;
        let id2 = t2.id;

        store.enqueue(t1).await.unwrap();
        store.enqueue(t2).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 2);

        let first = store.dequeue_next().await.unwrap().unwrap();
        assert_eq!(first.id, id1);
        let second = store.dequeue_next().await.unwrap().unwrap();
        assert_eq!(second.id, id2);
    }

    #[tokio::test]
    async fn test_leased_task_not_dequeued_twice() {
        let store = InMemoryQueueStore::new();
        let task = make_task(Step::Payment);
        store.enqueue(task).await.unwrap();

        assert!(store.dequeue_next().await.unwrap().is_some());
        assert!(store.dequeue_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_release_returns_task_to_back() {
        let store = InMemoryQueueStore::new();
        let t1 = make_task(Step::Payment);
        let t2 = make_task(Step::Shipping);
        let id1 = t1.id;
        let id2 = t2.id;
        store.enqueue(t1).await.unwrap();
        store.enqueue(t2).await.unwrap();

        let leased = store.dequeue_next().await.unwrap().unwrap();
        assert_eq!(leased.id, id1);
        store.release(id1).await.unwrap();

        // After release the other task is ahead in the queue.
        let next = store.dequeue_next().await.unwrap().unwrap();
        assert_eq!(next.id, id2);
        let after = store.dequeue_next().await.unwrap().unwrap();
        assert_eq!(after.id, id1);
    }

    #[tokio::test]
    async fn test_duplicate_order_step_rejected() {
        let store = InMemoryQueueStore::new();
        let task = make_task(Step::Payment);
        let order = task.order.clone();
        store.enqueue(task).await.unwrap();

        let dup = Task::new(order, Step::Payment, Duration::from_secs(240));
        let result = store.enqueue(dup).await;
        assert!(matches!(
            result,
            Err(QueueStoreError::DuplicateTask { .. })
        ));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_same_order_different_step_allowed() {
        let store = InMemoryQueueStore::new();
        let task = make_task(Step::Payment);
        let order = task.order.clone();
        store.enqueue(task).await.unwrap();
        store
            .enqueue(Task::new(order, Step::Shipping, Duration::from_secs(240)))
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_clears_task_and_lease() {
        let store = InMemoryQueueStore::new();
        let task = make_task(Step::Payment);
        let order_id = task.order_id();
        let id = task.id;
        store.enqueue(task).await.unwrap();
        store.dequeue_next().await.unwrap().unwrap();

        store.remove(id).await.unwrap();
        assert!(store.is_empty().await.unwrap());
        assert!(!store.contains(order_id, Step::Payment).await.unwrap());
        assert!(matches!(
            store.remove(id).await,
            Err(QueueStoreError::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_attempts() {
        let store = InMemoryQueueStore::new();
        let task = make_task(Step::Messaging);
        let id = task.id;
        store.enqueue(task).await.unwrap();

        store.update_attempts(id, 2).await.unwrap();
        let tasks = store.pending_tasks().await.unwrap();
        assert_eq!(tasks[0].attempts, 2);

        assert!(matches!(
            store.update_attempts(TaskId::new(), 1).await,
            Err(QueueStoreError::TaskNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_tasks_in_queue_order() {
        let store = InMemoryQueueStore::new();
        let t1 = make_task(Step::Payment);
        let t2 = make_task(Step::Shipping);
        let id1 = t1.id;
        let id2 = t2.id;
        store.enqueue(t1).await.unwrap();
        store.enqueue(t2).await.unwrap();

        let pending = store.pending_tasks().await.unwrap();
        assert_eq!(pending.iter().map(|t| t.id).collect::<Vec<_>>(), vec![id1, id2]);
    }
}
