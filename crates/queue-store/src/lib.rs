//! Durable retry queue for the commander system.
//!
//! When a step exhausts its immediate retries, the commander parks it here
//! as a [`Task`] and a background worker drains the queue later. The store
//! provides at-least-once delivery: a task is removed only after its retry
//! has been observed to succeed or to be permanently abandoned, and FIFO
//! order is preserved among live tasks.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod task;

pub use common::{OrderId, TaskId};
pub use error::{QueueStoreError, Result};
pub use memory::InMemoryQueueStore;
pub use postgres::PostgresQueueStore;
pub use store::QueueStore;
pub use task::Task;
