//! Order progress tracking.

use std::collections::HashMap;
use std::sync::Arc;

use common::OrderId;
use domain::{Order, OrderStatus, Step};
use tokio::sync::RwLock;

use crate::error::{CommanderError, OrderFailure};
use crate::state::StepState;

/// Progress record for a single order.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    /// The order being placed.
    pub order: Order,
    /// Overall lifecycle status.
    pub status: OrderStatus,
    /// Per-step states.
    steps: HashMap<Step, StepState>,
    /// Terminal failure diagnostic, if the order failed.
    pub failure: Option<OrderFailure>,
}

impl OrderRecord {
    fn new(order: Order) -> Self {
        Self {
            order,
            status: OrderStatus::Placing,
            steps: Step::ALL
                .into_iter()
                .map(|s| (s, StepState::NotStarted))
                .collect(),
            failure: None,
        }
    }

    /// Returns the state of one step.
    pub fn step_state(&self, step: Step) -> StepState {
        self.steps.get(&step).copied().unwrap_or_default()
    }
}

/// Shared progress board for all orders a commander is processing.
///
/// This is the order's persisted status: once a step is queued, the final
/// outcome of the placement is observable only here, not through the return
/// value of the original call. Shared between the foreground path and the
/// background worker.
#[derive(Clone, Default)]
pub struct OrderTracker {
    state: Arc<RwLock<HashMap<OrderId, OrderRecord>>>,
}

impl OrderTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new order about to be placed.
    ///
    /// Fails with [`DuplicateOrder`](CommanderError::DuplicateOrder) if the
    /// order is already known.
    pub async fn register(&self, order: Order) -> Result<(), CommanderError> {
        let mut state = self.state.write().await;
        let order_id = order.id();
        if state.contains_key(&order_id) {
            return Err(CommanderError::DuplicateOrder(order_id));
        }
        state.insert(order_id, OrderRecord::new(order));
        Ok(())
    }

    /// Re-registers an order recovered from a persisted task after a
    /// restart. Steps before the queued one are marked succeeded: steps
    /// run strictly in sequence, so a task for `queued_step` implies every
    /// earlier step already completed.
    pub async fn register_recovered(&self, order: Order, queued_step: Step) {
        let mut state = self.state.write().await;
        let order_id = order.id();
        if state.contains_key(&order_id) {
            return;
        }

        let mut record = OrderRecord::new(order);
        record.status = OrderStatus::Queued;
        for step in Step::ALL {
            if step == queued_step {
                record.steps.insert(step, StepState::Queued);
                break;
            }
            record.steps.insert(step, StepState::Succeeded);
        }
        state.insert(order_id, record);
    }

    /// Sets the state of one step.
    pub async fn set_step_state(&self, order_id: OrderId, step: Step, step_state: StepState) {
        let mut state = self.state.write().await;
        if let Some(record) = state.get_mut(&order_id) {
            record.steps.insert(step, step_state);
        }
    }

    /// Moves the order into the queued status, unless already terminal.
    pub async fn mark_queued(&self, order_id: OrderId) {
        let mut state = self.state.write().await;
        if let Some(record) = state.get_mut(&order_id)
            && !record.status.is_terminal()
        {
            record.status = OrderStatus::Queued;
        }
    }

    /// Marks the order completed.
    pub async fn mark_completed(&self, order_id: OrderId) {
        let mut state = self.state.write().await;
        if let Some(record) = state.get_mut(&order_id) {
            record.status = OrderStatus::Completed;
        }
    }

    /// Marks the order failed with a terminal diagnostic.
    pub async fn mark_failed(&self, order_id: OrderId, failure: OrderFailure) {
        let mut state = self.state.write().await;
        if let Some(record) = state.get_mut(&order_id) {
            record.status = OrderStatus::Failed;
            record.failure = Some(failure);
        }
    }

    /// Returns true if the order is known to this tracker.
    pub async fn is_known(&self, order_id: OrderId) -> bool {
        self.state.read().await.contains_key(&order_id)
    }

    /// Returns the order's overall status.
    pub async fn status(&self, order_id: OrderId) -> Option<OrderStatus> {
        self.state.read().await.get(&order_id).map(|r| r.status)
    }

    /// Returns a snapshot of the order's full progress record.
    pub async fn record(&self, order_id: OrderId) -> Option<OrderRecord> {
        self.state.read().await.get(&order_id).cloned()
    }

    /// Returns the order's terminal failure diagnostic, if any.
    pub async fn failure(&self, order_id: OrderId) -> Option<OrderFailure> {
        self.state
            .read()
            .await
            .get(&order_id)
            .and_then(|r| r.failure.clone())
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
    async fn test_register_and_initial_state() {
        let tracker = OrderTracker::new();
        let order = sample_order();
        let order_id = order.id();

        tracker.register(order).await.unwrap();

        assert_eq!(tracker.status(order_id).await, Some(OrderStatus::Placing));
        let record = tracker.record(order_id).await.unwrap();
        for step in Step::ALL {
            assert_eq!(record.step_state(step), StepState::NotStarted);
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let tracker = OrderTracker::new();
        let order = sample_order();

        tracker.register(order.clone()).await.unwrap();
        assert!(matches!(
            tracker.register(order).await,
            Err(CommanderError::DuplicateOrder(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_failed_records_diagnostic() {
        let tracker = OrderTracker::new();
        let order = sample_order();
        let order_id = order.id();
        tracker.register(order).await.unwrap();

        tracker
            .mark_failed(
                order_id,
                OrderFailure::Permanent {
                    step: Step::Shipping,
                    reason: "item unavailable".to_string(),
                },
            )
            .await;

        assert_eq!(tracker.status(order_id).await, Some(OrderStatus::Failed));
        assert_eq!(
            tracker.failure(order_id).await.unwrap().step(),
            Step::Shipping
        );
    }

    #[tokio::test]
    async fn test_mark_queued_does_not_override_terminal() {
        let tracker = OrderTracker::new();
        let order = sample_order();
        let order_id = order.id();
        tracker.register(order).await.unwrap();

        tracker.mark_completed(order_id).await;
        tracker.mark_queued(order_id).await;
        assert_eq!(tracker.status(order_id).await, Some(OrderStatus::Completed));
    }

    #[tokio::test]
    async fn test_register_recovered_marks_earlier_steps_succeeded() {
        let tracker = OrderTracker::new();
        let order = sample_order();
        let order_id = order.id();

        tracker.register_recovered(order, Step::Messaging).await;

        let record = tracker.record(order_id).await.unwrap();
        assert_eq!(record.status, OrderStatus::Queued);
        assert_eq!(record.step_state(Step::Payment), StepState::Succeeded);
        assert_eq!(record.step_state(Step::Shipping), StepState::Succeeded);
        assert_eq!(record.step_state(Step::Messaging), StepState::Queued);
        assert_eq!(record.step_state(Step::Employee), StepState::NotStarted);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let tracker = OrderTracker::new();
        assert!(tracker.status(OrderId::new()).await.is_none());
        assert!(!tracker.is_known(OrderId::new()).await);
    }
}
