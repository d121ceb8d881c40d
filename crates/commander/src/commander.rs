//! The commander: sequences the four steps of an order placement.

use std::time::Instant;

use common::OrderId;
use domain::{Order, OrderStatus, Step};
use queue_store::{QueueStore, Task};

use crate::config::CommanderConfig;
use crate::error::{CommanderError, OrderFailure, StepFailure};
use crate::services::{EmployeeService, MessagingService, PaymentService, ShippingService};
use crate::state::StepState;
use crate::tracker::OrderTracker;

/// Outcome of one immediate-retry cycle for a single step.
#[derive(Debug)]
enum StepOutcome {
    /// The service call succeeded within the cycle.
    Succeeded,
    /// The service rejected the step; carries the reason.
    Permanent(String),
    /// Still failing transiently when the cycle's budget ran out.
    Exhausted,
}

/// Orchestrates order placement across the four services.
///
/// Steps run strictly in sequence (Payment, Shipping, Messaging, Employee)
/// because each later step depends on the one before it. A step
/// that keeps failing transiently is parked in the queue store and the
/// placement call returns; a [`QueueWorker`](crate::QueueWorker) over the
/// same commander finishes the order in the background. A permanent
/// failure aborts the order immediately; already-succeeded steps are not
/// compensated (known non-goal of this core).
pub struct Commander<Q, P, S, M, E>
where
    Q: QueueStore,
    P: PaymentService,
    S: ShippingService,
    M: MessagingService,
    E: EmployeeService,
{
    queue: Q,
    payment: P,
    shipping: S,
    messaging: M,
    employee: E,
    tracker: OrderTracker,
    config: CommanderConfig,
}

impl<Q, P, S, M, E> Commander<Q, P, S, M, E>
where
    Q: QueueStore,
    P: PaymentService,
    S: ShippingService,
    M: MessagingService,
    E: EmployeeService,
{
    /// Creates a new commander over the given queue store and services.
    pub fn new(
        queue: Q,
        payment: P,
        shipping: S,
        messaging: M,
        employee: E,
        config: CommanderConfig,
    ) -> Self {
        Self {
            queue,
            payment,
            shipping,
            messaging,
            employee,
            tracker: OrderTracker::new(),
            config,
        }
    }

    /// Returns the order progress tracker.
    pub fn tracker(&self) -> &OrderTracker {
        &self.tracker
    }

    /// Returns the commander configuration.
    pub fn config(&self) -> &CommanderConfig {
        &self.config
    }

    /// Returns the queue store.
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Places an order: runs the four steps in sequence.
    ///
    /// Returns once every step has succeeded or been enqueued, or a
    /// permanent failure has been observed. When the returned status is
    /// [`OrderStatus::Queued`], the final outcome is observable through
    /// [`status`](Commander::status), not through this call.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn place_order(&self, order: Order) -> Result<OrderStatus, CommanderError> {
        metrics::counter!("orders_placed_total").increment(1);
        let start = Instant::now();

        self.tracker.register(order.clone()).await?;
        let status = self.run_steps(&order, Step::Payment).await?;

        metrics::histogram!("place_order_duration_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(%status, "order placement returned");
        Ok(status)
    }

    /// Returns the order's current status.
    pub async fn status(&self, order_id: OrderId) -> Result<OrderStatus, CommanderError> {
        self.tracker
            .status(order_id)
            .await
            .ok_or(CommanderError::UnknownOrder(order_id))
    }

    /// Returns the order's terminal failure diagnostic, if it failed.
    pub async fn failure(&self, order_id: OrderId) -> Option<OrderFailure> {
        self.tracker.failure(order_id).await
    }

    /// Processes one leased task: re-runs its step's retry cycle, bounded
    /// by `queue_task_time` and the task's absolute deadline.
    ///
    /// Called by the [`QueueWorker`](crate::QueueWorker) with a task
    /// obtained from [`QueueStore::dequeue_next`]; the lease guarantees no
    /// concurrent attempt for the same `(order, step)` pair.
    #[tracing::instrument(skip(self, task), fields(order_id = %task.order_id(), step = %task.step, task_id = %task.id))]
    pub async fn process_task(&self, task: Task) -> Result<(), CommanderError> {
        let order_id = task.order_id();

        // After a restart the tracker may not know this order yet.
        if !self.tracker.is_known(order_id).await {
            self.tracker
                .register_recovered(task.order.clone(), task.step)
                .await;
            tracing::info!("order recovered from persisted task");
        }

        // An already-expired task is abandoned without one more retry.
        if task.is_expired() {
            return self.abandon(task).await;
        }

        let cycle_deadline = Instant::now() + self.config.queue_task_time;
        let outcome = self
            .attempt_step(&task.order, task.step, Some(cycle_deadline))
            .await;

        match outcome {
            StepOutcome::Succeeded => {
                self.queue.remove(task.id).await?;
                self.tracker
                    .set_step_state(order_id, task.step, StepState::Succeeded)
                    .await;
                match task.step.next() {
                    Some(next) => {
                        self.run_steps(&task.order, next).await?;
                    }
                    None => {
                        self.complete(order_id).await;
                    }
                }
                Ok(())
            }
            StepOutcome::Permanent(reason) => {
                self.queue.remove(task.id).await?;
                self.tracker
                    .set_step_state(order_id, task.step, StepState::PermanentlyFailed)
                    .await;
                self.fail(order_id, OrderFailure::Permanent {
                    step: task.step,
                    reason,
                })
                .await;
                Ok(())
            }
            StepOutcome::Exhausted => {
                if task.is_expired() {
                    self.abandon(task).await
                } else {
                    self.queue.update_attempts(task.id, task.attempts + 1).await?;
                    self.queue.release(task.id).await?;
                    self.tracker
                        .set_step_state(order_id, task.step, StepState::Queued)
                        .await;
                    metrics::counter!("tasks_requeued").increment(1);
                    tracing::debug!(attempts = task.attempts + 1, "task re-queued");
                    Ok(())
                }
            }
        }
    }

    /// Runs steps from `from` to the end of the fixed order.
    async fn run_steps(&self, order: &Order, from: Step) -> Result<OrderStatus, CommanderError> {
        let order_id = order.id();

        for &step in from.remaining() {
            match self.attempt_step(order, step, None).await {
                StepOutcome::Succeeded => {
                    self.tracker
                        .set_step_state(order_id, step, StepState::Succeeded)
                        .await;
                }
                StepOutcome::Permanent(reason) => {
                    self.tracker
                        .set_step_state(order_id, step, StepState::PermanentlyFailed)
                        .await;
                    self.fail(order_id, OrderFailure::Permanent { step, reason })
                        .await;
                    return Ok(OrderStatus::Failed);
                }
                StepOutcome::Exhausted => {
                    let task = Task::new(order.clone(), step, self.config.deadline_for(step));
                    let task_id = self.queue.enqueue(task).await?;
                    self.tracker
                        .set_step_state(order_id, step, StepState::Queued)
                        .await;
                    self.tracker.mark_queued(order_id).await;
                    metrics::counter!("tasks_enqueued").increment(1);
                    tracing::info!(%step, %task_id, "step handed to retry queue");
                    return Ok(OrderStatus::Queued);
                }
            }
        }

        self.complete(order_id).await;
        Ok(OrderStatus::Completed)
    }

    /// One immediate-retry cycle: up to `retry_limit` calls spaced by
    /// `retry_delay`, optionally bounded by a wall-clock deadline.
    async fn attempt_step(
        &self,
        order: &Order,
        step: Step,
        cycle_deadline: Option<Instant>,
    ) -> StepOutcome {
        let order_id = order.id();
        self.tracker
            .set_step_state(order_id, step, StepState::Attempting)
            .await;

        let mut calls = 0u32;
        loop {
            calls += 1;
            metrics::counter!("step_attempts_total", "step" => step.as_str()).increment(1);

            match self.call_service(step, order).await {
                Ok(()) => {
                    tracing::debug!(%step, calls, "step succeeded");
                    return StepOutcome::Succeeded;
                }
                Err(StepFailure::Permanent { reason }) => {
                    tracing::warn!(%step, %reason, "step rejected permanently");
                    return StepOutcome::Permanent(reason);
                }
                Err(StepFailure::Transient { reason }) => {
                    tracing::debug!(%step, %reason, calls, "transient failure");
                    if calls >= self.config.retry_limit {
                        return StepOutcome::Exhausted;
                    }
                    if let Some(deadline) = cycle_deadline
                        && Instant::now() + self.config.retry_delay >= deadline
                    {
                        return StepOutcome::Exhausted;
                    }
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// Dispatches to the step's service port, in the fixed step order.
    async fn call_service(&self, step: Step, order: &Order) -> Result<(), StepFailure> {
        match step {
            Step::Payment => self.payment.attempt(order).await,
            Step::Shipping => self.shipping.attempt(order).await,
            Step::Messaging => self.messaging.attempt(order).await,
            Step::Employee => self.employee.attempt(order).await,
        }
    }

    async fn complete(&self, order_id: OrderId) {
        self.tracker.mark_completed(order_id).await;
        metrics::counter!("orders_completed").increment(1);
        tracing::info!(%order_id, "order completed");
    }

    async fn fail(&self, order_id: OrderId, failure: OrderFailure) {
        tracing::warn!(%order_id, %failure, "order failed");
        self.tracker.mark_failed(order_id, failure).await;
        metrics::counter!("orders_failed").increment(1);
    }

    /// Removes an expired task and fails the order with a
    /// deadline-exceeded diagnostic.
    async fn abandon(&self, task: Task) -> Result<(), CommanderError> {
        let elapsed_ms = task.elapsed().num_milliseconds();
        self.queue.remove(task.id).await?;
        self.tracker
            .set_step_state(task.order_id(), task.step, StepState::Abandoned)
            .await;
        self.fail(task.order_id(), OrderFailure::DeadlineExceeded {
            step: task.step,
            elapsed_ms,
        })
        .await;
        metrics::counter!("tasks_abandoned").increment(1);
        Ok(())
    }
}
