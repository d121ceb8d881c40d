//! Shipping service port and in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::error::StepFailure;

/// Port for the shipping step.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Arranges shipment of the ordered item. Must be idempotent: retrying
    /// after a recorded shipment must not ship again.
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure>;
}

#[derive(Debug, Default)]
struct InMemoryShippingState {
    shipments: HashMap<OrderId, String>,
    next_id: u32,
    script: VecDeque<StepFailure>,
    permanent: Option<StepFailure>,
    attempts: u32,
}

/// In-memory shipping service with scripted fault injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a shipping service that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a shipping service that returns the given failures in order,
    /// one per attempt, before succeeding.
    pub fn with_failures(failures: impl IntoIterator<Item = StepFailure>) -> Self {
        let service = Self::default();
        service.state.write().unwrap().script = failures.into_iter().collect();
        service
    }

    /// Creates a shipping service that never succeeds.
    pub fn with_permanent_failure(failure: StepFailure) -> Self {
        let service = Self::default();
        service.state.write().unwrap().permanent = Some(failure);
        service
    }

    /// Returns the total number of attempt calls observed.
    pub fn attempt_count(&self) -> u32 {
        self.state.read().unwrap().attempts
    }

    /// Returns the number of recorded shipments.
    pub fn shipment_count(&self) -> usize {
        self.state.read().unwrap().shipments.len()
    }

    /// Returns true if a shipment exists for the order.
    pub fn has_shipped(&self, order_id: OrderId) -> bool {
        self.state.read().unwrap().shipments.contains_key(&order_id)
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn attempt(&self, order: &Order) -> Result<(), StepFailure> {
        let mut state = self.state.write().unwrap();
        state.attempts += 1;

        if state.shipments.contains_key(&order.id()) {
            return Ok(());
        }

        if let Some(failure) = state.permanent.clone() {
            return Err(failure);
        }
        if let Some(failure) = state.script.pop_front() {
            return Err(failure);
        }

        state.next_id += 1;
        let tracking_number = format!("TRACK-{:04}", state.next_id);
        state.shipments.insert(order.id(), tracking_number);
        Ok(())
    }
}
