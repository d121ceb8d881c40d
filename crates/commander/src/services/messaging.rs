//! Messaging service port and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::error::StepFailure;

/// Port for the user-notification step.
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Sends the user a confirmation message for the order. Must be
    /// idempotent: retrying after a recorded message must not send again.
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure>;
}

#[derive(Debug, Default)]
struct InMemoryMessagingState {
    messages: HashMap<OrderId, String>,
    script: VecDeque<StepFailure>,
    permanent: Option<StepFailure>,
    attempts: u32,
}

/// In-memory messaging service with scripted fault injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessagingService {
    state: Arc<RwLock<InMemoryMessagingState>>,
}

impl InMemoryMessagingService {
    /// Creates a messaging service that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a messaging service that returns the given failures in
    /// order, one per attempt, before succeeding.
    pub fn with_failures(failures: impl IntoIterator<Item = StepFailure>) -> Self {
        let service = Self::default();
        service.state.write().unwrap().script = failures.into_iter().collect();
        service
    }

    /// Creates a messaging service that never succeeds.
    pub fn with_permanent_failure(failure: StepFailure) -> Self {
        let service = Self::default();
        service.state.write().unwrap().permanent = Some(failure);
        service
    }

    /// Returns the total number of attempt calls observed.
    pub fn attempt_count(&self) -> u32 {
        self.state.read().unwrap().attempts
    }

    /// Returns the number of messages sent.
    pub fn message_count(&self) -> usize {
        self.state.read().unwrap().messages.len()
    }

    /// Returns true if a confirmation was sent for the order.
    pub fn has_messaged(&self, order_id: OrderId) -> bool {
        self.state.read().unwrap().messages.contains_key(&order_id)
    }
}

#[async_trait]
impl MessagingService for InMemoryMessagingService {
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.messages.contains_key(&order.id()) {
            return Ok(());
        }

        if let Some(failure) = state.permanent.clone() {
            return Err(failure);
        }
        if let Some(failure) = state.script.pop_front() {
            return Err(failure);
        }

        let text = format!(
            "Hello {}, your order for {} has been placed.",
            order.user().name(),
            order.item()
        );
        state.messages.insert(order.id(), text);
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
    async fn test_message_sent_once() {
        let service = InMemoryMessagingService::new();
        let order = sample_order();

        service.attempt(&order).await.unwrap();
        service.attempt(&order).await.unwrap();

        assert_eq!(service.message_count(), 1);
        assert!(service.has_messaged(order.id()));
    }

    #[tokio::test]
    async fn test_scripted_failure_then_success() {
        let service =
            InMemoryMessagingService::with_failures(vec![StepFailure::database_unavailable()]);
        let order = sample_order();

        assert!(service.attempt(&order).await.unwrap_err().is_transient());
        service.attempt(&order).await.unwrap();
        assert_eq!(service.message_count(), 1);
    }
}
