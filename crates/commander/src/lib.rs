//! Commander orchestration core.
//!
//! A single coordinator drives order placement across four independent,
//! unreliable services (payment, shipping, messaging, and employee
//! notification) and guarantees the order eventually reaches a consistent
//! terminal state:
//!
//! 1. Each step gets a bounded budget of immediate retries for transient
//!    failures.
//! 2. A step still failing when the budget runs out is parked as a durable
//!    task in the queue store; the placement call returns without blocking.
//! 3. A background [`QueueWorker`] drains the queue, re-running steps in
//!    bounded cycles until they succeed, fail permanently, or outlive their
//!    per-step absolute deadline.
//!
//! A permanent failure aborts the order immediately; already-succeeded
//! steps are not compensated.

pub mod commander;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tracker;
pub mod worker;

pub use commander::Commander;
pub use config::CommanderConfig;
pub use error::{CommanderError, OrderFailure, StepFailure};
pub use services::{
    EmployeeService, InMemoryEmployeeService, InMemoryMessagingService, InMemoryPaymentService,
    InMemoryShippingService, MessagingService, PaymentService, ShippingService,
};
pub use state::StepState;
pub use tracker::{OrderRecord, OrderTracker};
pub use worker::{QueueWorker, WorkerHandle};
