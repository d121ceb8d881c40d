//! Service port traits and fault-injecting in-memory implementations.
//!
//! Each port exposes the same capability, `attempt(&Order)`, and reports
//! failures through the closed [`StepFailure`](crate::StepFailure)
//! taxonomy. Ports must be idempotent under repeated calls with the same
//! order ID: a retry after a recorded effect is a no-op.

pub mod employee;
pub mod messaging;
pub mod payment;
pub mod shipping;

pub use employee::{EmployeeService, InMemoryEmployeeService};
pub use messaging::{InMemoryMessagingService, MessagingService};
pub use payment::{InMemoryPaymentService, PaymentService};
pub use shipping::{InMemoryShippingService, ShippingService};
