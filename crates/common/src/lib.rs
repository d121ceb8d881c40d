//! Shared identifier types used across the commander workspace.

pub mod types;

pub use types::{OrderId, TaskId};
