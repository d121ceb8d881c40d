use async_trait::async_trait;
use common::{OrderId, TaskId};
use domain::{Order, Step};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{QueueStoreError, Result, Task, store::QueueStore};

/// PostgreSQL-backed queue store implementation.
///
/// The durable path: tasks survive orchestrator restarts, and a worker
/// constructed over the same pool resumes whatever rows are present.
/// Leasing uses `FOR UPDATE SKIP LOCKED` so concurrent workers never
/// observe the same task.
#[derive(Clone)]
pub struct PostgresQueueStore {
    pool: PgPool,
}

impl PostgresQueueStore {
    /// Creates a new PostgreSQL queue store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the queue schema if it does not exist yet.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::raw_sql(include_str!(
            "../../../migrations/001_create_queue_tasks_table.sql"
        ))
        .execute(&self.pool)
        .await?;
        tracing::debug!("queue_tasks schema ensured");
        Ok(())
    }

    fn row_to_task(row: PgRow) -> Result<Task> {
        let step: String = row.try_get("step")?;
        let step: Step = step
            .parse()
            .map_err(|e: domain::UnknownStep| QueueStoreError::CorruptRecord(e.to_string()))?;

        let attempts: i32 = row.try_get("attempts")?;
        let attempts = u32::try_from(attempts).map_err(|_| {
            QueueStoreError::CorruptRecord(format!("negative attempt count: {attempts}"))
        })?;

        let payload: serde_json::Value = row.try_get("order_payload")?;
        let order: Order = serde_json::from_value(payload)?;

        Ok(Task {
            id: TaskId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order,
            step,
            attempts,
            created_at: row.try_get("created_at")?,
            deadline: row.try_get("deadline")?,
        })
    }
}

const TASK_COLUMNS: &str = "id, order_id, step, attempts, created_at, deadline, order_payload";

#[async_trait]
impl QueueStore for PostgresQueueStore {
    async fn enqueue(&self, task: Task) -> Result<TaskId> {
        let payload = serde_json::to_value(&task.order)?;

        sqlx::query(
            r#"
            INSERT INTO queue_tasks (id, order_id, step, attempts, created_at, deadline, order_payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(task.order_id().as_uuid())
        .bind(task.step.as_str())
        .bind(task.attempts as i32)
        .bind(task.created_at)
        .bind(task.deadline)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_order_step")
            {
                return QueueStoreError::DuplicateTask {
                    order_id: task.order_id(),
                    step: task.step,
                };
            }
            QueueStoreError::Database(e)
        })?;

        Ok(task.id)
    }

    async fn dequeue_next(&self) -> Result<Option<Task>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM queue_tasks \
             WHERE leased = FALSE ORDER BY seq LIMIT 1 FOR UPDATE SKIP LOCKED"
        ))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let task = Self::row_to_task(row)?;

        sqlx::query("UPDATE queue_tasks SET leased = TRUE WHERE id = $1")
            .bind(task.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    async fn remove(&self, task_id: TaskId) -> Result<()> {
        let result = sqlx::query("DELETE FROM queue_tasks WHERE id = $1")
            .bind(task_id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(QueueStoreError::TaskNotFound(task_id));
        }
        Ok(())
    }

    async fn update_attempts(&self, task_id: TaskId, attempts: u32) -> Result<()> {
        let result = sqlx::query("UPDATE queue_tasks SET attempts = $2 WHERE id = $1")
            .bind(task_id.as_uuid())
            .bind(attempts as i32)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(QueueStoreError::TaskNotFound(task_id));
        }
        Ok(())
    }

    async fn release(&self, task_id: TaskId) -> Result<()> {
        // Reassigning seq moves the task to the back of the FIFO order.
        let result = sqlx::query(
            "UPDATE queue_tasks \
             SET leased = FALSE, seq = nextval(pg_get_serial_sequence('queue_tasks', 'seq')) \
             WHERE id = $1",
        )
        .bind(task_id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueueStoreError::TaskNotFound(task_id));
        }
        Ok(())
    }

    async fn contains(&self, order_id: OrderId, step: Step) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM queue_tasks WHERE order_id = $1 AND step = $2)",
        )
        .bind(order_id.as_uuid())
        .bind(step.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn pending_tasks(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM queue_tasks ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    async fn len(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }
}
