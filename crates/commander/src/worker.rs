//! Background queue-draining worker.

use std::sync::Arc;

use queue_store::QueueStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::commander::Commander;
use crate::error::CommanderError;
use crate::services::{EmployeeService, MessagingService, PaymentService, ShippingService};

/// Long-lived worker that drains the retry queue.
///
/// Communicates with the foreground placement path only through the queue
/// store; the store's lease is what enforces at most one in-flight attempt
/// per `(order, step)` pair, so the worker never shares mutable order
/// state with anyone.
pub struct QueueWorker<Q, P, S, M, E>
where
    Q: QueueStore,
    P: PaymentService,
    S: ShippingService,
    M: MessagingService,
    E: EmployeeService,
{
    commander: Arc<Commander<Q, P, S, M, E>>,
}

impl<Q, P, S, M, E> QueueWorker<Q, P, S, M, E>
where
    Q: QueueStore,
    P: PaymentService,
    S: ShippingService,
    M: MessagingService,
    E: EmployeeService,
{
    /// Creates a worker over the given commander.
    pub fn new(commander: Arc<Commander<Q, P, S, M, E>>) -> Self {
        Self { commander }
    }

    /// Processes tasks until the queue is empty.
    ///
    /// Tasks that get re-queued are picked up again within the same call,
    /// so this returns only once every task has succeeded or been
    /// abandoned. Used by tests and shutdown paths.
    pub async fn drain(&self) -> Result<(), CommanderError> {
        while let Some(task) = self.commander.queue().dequeue_next().await? {
            self.commander.process_task(task).await?;
        }
        Ok(())
    }

    /// Runs the worker loop until `shutdown` flips to true.
    ///
    /// Store errors are logged and retried after the poll interval rather
    /// than killing the loop; abandoning one task never stops the others.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("queue worker started");

        loop {
            match self.commander.queue().dequeue_next().await {
                Ok(Some(task)) => {
                    if let Err(e) = self.commander.process_task(task).await {
                        tracing::error!(error = %e, "task processing failed");
                    }
                }
                Ok(None) => {
                    self.idle(&mut shutdown).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "dequeue failed");
                    self.idle(&mut shutdown).await;
                }
            }

            if *shutdown.borrow() {
                break;
            }
        }

        tracing::info!("queue worker stopped");
    }

    /// Sleeps for the poll interval, waking early on shutdown.
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) {
        tokio::select! {
            _ = shutdown.changed() => {}
            _ = tokio::time::sleep(self.commander.config().poll_interval) => {}
        }
    }
}

impl<Q, P, S, M, E> QueueWorker<Q, P, S, M, E>
where
    Q: QueueStore + 'static,
    P: PaymentService + 'static,
    S: ShippingService + 'static,
    M: MessagingService + 'static,
    E: EmployeeService + 'static,
{
    /// Spawns the worker onto the runtime, returning a shutdown handle.
    pub fn spawn(self) -> WorkerHandle {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { self.run(rx).await });
        WorkerHandle {
            shutdown: tx,
            handle,
        }
    }
}

/// Handle to a spawned [`QueueWorker`].
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signals the worker to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
