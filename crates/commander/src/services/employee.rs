//! Employee notification port and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::error::StepFailure;

/// Port for the employee-notification step.
#[async_trait]
pub trait EmployeeService: Send + Sync {
    /// Records the order with the employee handle. Must be idempotent:
    /// retrying after a recorded notification must not record again.
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure>;
}

#[derive(Debug, Default)]
struct InMemoryEmployeeState {
    records: HashMap<OrderId, Order>,
    script: VecDeque<StepFailure>,
    permanent: Option<StepFailure>,
    attempts: u32,
}

/// In-memory employee handle with scripted fault injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmployeeService {
    state: Arc<RwLock<InMemoryEmployeeState>>,
}

impl InMemoryEmployeeService {
    /// Creates an employee service that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an employee service that returns the given failures in
    /// order, one per attempt, before succeeding.
    pub fn with_failures(failures: impl IntoIterator<Item = StepFailure>) -> Self {
        let service = Self::default();
        service.state.write().unwrap().script = failures.into_iter().collect();
        service
    }

    /// Creates an employee service that never succeeds.
    pub fn with_permanent_failure(failure: StepFailure) -> Self {
        let service = Self::default();
        service.state.write().unwrap().permanent = Some(failure);
        service
    }

    /// Returns the total number of attempt calls observed.
    pub fn attempt_count(&self) -> u32 {
        self.state.read().unwrap().attempts
    }

    /// Returns the number of recorded orders.
    pub fn record_count(&self) -> usize {
        self.state.read().unwrap().records.len()
    }

    /// Returns true if the order was recorded.
    pub fn has_recorded(&self, order_id: OrderId) -> bool {
        self.state.read().unwrap().records.contains_key(&order_id)
    }
}

#[async_trait]
impl EmployeeService for InMemoryEmployeeService {
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.records.contains_key(&order.id()) {
            return Ok(());
        }

        if let Some(failure) = state.permanent.clone() {
            return Err(failure);
        }
        if let Some(failure) = state.script.pop_front() {
            return Err(failure);
        }

        state.records.insert(order.id(), order.clone());
        Ok(())
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

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let service = InMemoryEmployeeService::new();
        let order = sample_order();

        service.attempt(&order).await.unwrap();
        service.attempt(&order).await.unwrap();

        assert_eq!(service.record_count(), 1);
        assert!(service.has_recorded(order.id()));
    }

    #[tokio::test]
    async fn test_scripted_failure_then_success() {
        let service =
            InMemoryEmployeeService::with_failures(vec![StepFailure::database_unavailable()]);
        let order = sample_order();

        assert!(service.attempt(&order).await.unwrap_err().is_transient());
        service.attempt(&order).await.unwrap();
        assert_eq!(service.record_count(), 1);
    }
}
