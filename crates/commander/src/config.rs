//! Commander configuration.

use std::time::Duration;

use domain::Step;

/// Retry and deadline configuration for the commander.
///
/// Immutable once constructed and injected into the [`Commander`]; there is
/// no ambient global configuration. Defaults match the production constants
/// of the order placement system; tests override individual fields with
/// struct update syntax:
///
/// ```
/// use std::time::Duration;
/// use commander::CommanderConfig;
///
/// let config = CommanderConfig {
///     retry_delay: Duration::from_millis(5),
///     ..CommanderConfig::default()
/// };
/// assert_eq!(config.retry_limit, 3);
/// ```
///
/// [`Commander`]: crate::Commander
#[derive(Debug, Clone)]
pub struct CommanderConfig {
    /// Total immediate service calls per retry cycle before the step is
    /// handed to the queue (default: 3).
    pub retry_limit: u32,

    /// Delay between immediate calls within a cycle (default: 30s).
    pub retry_delay: Duration,

    /// Wall-clock bound on a single dequeue-and-retry cycle; past it the
    /// task is re-queued rather than retried further inline, so one stuck
    /// task cannot monopolize the worker (default: 60s).
    pub queue_task_time: Duration,

    /// Absolute deadline for a queued payment step (default: 2 min).
    pub payment_time: Duration,

    /// Absolute deadline for a queued shipping step (default: 4 min).
    pub queue_time: Duration,

    /// Absolute deadline for a queued messaging step (default: 2.5 min).
    pub message_time: Duration,

    /// Absolute deadline for a queued employee step (default: 4 min).
    pub employee_time: Duration,

    /// How long the background worker sleeps when the queue is empty
    /// (default: 1s).
    pub poll_interval: Duration,
}

impl CommanderConfig {
    /// Returns the absolute deadline ceiling for a queued task of `step`,
    /// measured from task creation.
    pub fn deadline_for(&self, step: Step) -> Duration {
        match step {
            Step::Payment => self.payment_time,
            Step::Shipping => self.queue_time,
            Step::Messaging => self.message_time,
            Step::Employee => self.employee_time,
        }
    }
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            retry_delay: Duration::from_secs(30),
            queue_task_time: Duration::from_secs(60),
            payment_time: Duration::from_secs(120),
            queue_time: Duration::from_secs(240),
            message_time: Duration::from_secs(150),
            employee_time: Duration::from_secs(240),
            poll_interval: Duration::from_secs(1),
        }
    }
}
