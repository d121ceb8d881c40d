//! The durable unit of retry work.

use chrono::{DateTime, Duration, Utc};
use common::{OrderId, TaskId};
use domain::{Order, Step};
use serde::{Deserialize, Serialize};

/// One outstanding unit of retry work for a single `(order, step)` pair.
///
/// Created when a step's immediate-retry budget is exhausted. The full
/// order snapshot is embedded so a restarted worker can resume processing
/// without a separate order repository; the order is immutable, so the
/// snapshot can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Snapshot of the order being retried.
    pub order: Order,
    /// The step awaiting retry.
    pub step: Step,
    /// Queued retry cycles performed so far.
    pub attempts: u32,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// Absolute deadline; past this instant the task is abandoned.
    pub deadline: DateTime<Utc>,
}

impl Task {
    /// Creates a new task whose deadline is `ttl` from now.
    pub fn new(order: Order, step: Step, ttl: std::time::Duration) -> Self {
        let created_at = Utc::now();
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(3650));
        Self {
            id: TaskId::new(),
            order,
            step,
            attempts: 0,
            created_at,
            deadline: created_at + ttl,
        }
    }

    /// Returns the ID of the order this task belongs to.
    pub fn order_id(&self) -> OrderId {
        self.order.id()
    }

    /// Returns true if the task's absolute deadline has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    /// Returns true if the task's absolute deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time elapsed since the task was created.
    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, User};

    fn sample_order() -> Order {
        let user = User::new("Jim", "ABCD").unwrap();
        Order::new(user, "book", Money::from_dollars(10)).unwrap()
    }

    #[test]
    fn test_new_task_starts_with_zero_attempts() {
        let task = Task::new(sample_order(), Step::Shipping, std::time::Duration::from_secs(240));
        assert_eq!(task.attempts, 0);
        assert_eq!(task.step, Step::Shipping);
        assert!(!task.is_expired());
    }

    #[test]
    fn test_deadline_measured_from_creation() {
        let task = Task::new(sample_order(), Step::Payment, std::time::Duration::from_secs(120));
        let ttl = task.deadline - task.created_at;
        assert_eq!(ttl, Duration::seconds(120));
    }

    #[test]
    fn test_expiry() {
        let task = Task::new(sample_order(), Step::Payment, std::time::Duration::from_millis(0));
        assert!(task.is_expired_at(task.created_at + Duration::seconds(1)));
        assert!(!task.is_expired_at(task.created_at));
    }

    #[test]
    fn test_order_id_comes_from_snapshot() {
        let order = sample_order();
        let id = order.id();
        let task = Task::new(order, Step::Messaging, std::time::Duration::from_secs(150));
        assert_eq!(task.order_id(), id);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let task = Task::new(sample_order(), Step::Employee, std::time::Duration::from_secs(240));
        let json = serde_json::to_string(&task).unwrap();
        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, deserialized);
    }
}
