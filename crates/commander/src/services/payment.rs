//! Payment service port and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::error::StepFailure;

/// Port for the payment step.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges the user for the order. Must be idempotent: retrying after
    /// a recorded charge must not charge again.
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    receipts: HashMap<OrderId, String>,
    next_id: u32,
    script: VecDeque<StepFailure>,
    permanent: Option<StepFailure>,
    attempts: u32,
}

/// In-memory payment service with scripted fault injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a payment service that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payment service that returns the given failures in order,
    /// one per attempt, before succeeding.
    pub fn with_failures(failures: impl IntoIterator<Item = StepFailure>) -> Self {
        let service = Self::default();
        service.state.write().unwrap().script = failures.into_iter().collect();
        service
    }

    /// Creates a payment service that never succeeds.
    pub fn with_permanent_failure(failure: StepFailure) -> Self {
        let service = Self::default();
        service.state.write().unwrap().permanent = Some(failure);
        service
    }

    /// Returns the total number of attempt calls observed.
    pub fn attempt_count(&self) -> u32 {
        self.state.read().unwrap().attempts
    }

    /// Returns the number of recorded charges.
    pub fn receipt_count(&self) -> usize {
        self.state.read().unwrap().receipts.len()
    }

    /// Returns true if the order has been charged.
    pub fn has_charged(&self, order_id: OrderId) -> bool {
        self.state.read().unwrap().receipts.contains_key(&order_id)
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        // Idempotency: a retry after a recorded charge is a no-op.
        if state.receipts.contains_key(&order.id()) {
            return Ok(());
        }

        if let Some(failure) = state.permanent.clone() {
            return Err(failure);
        }
        if let Some(failure) = state.script.pop_front() {
            return Err(failure);
        }

        state.next_id += 1;
        let receipt = format!("PAY-{:04}", state.next_id);
        state.receipts.insert(order.id(), receipt);
        Ok(())
    }
}
