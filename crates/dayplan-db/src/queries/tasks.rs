//! Database query functions for the `tasks` table.
//!
//! Tasks are addressed by their index in `(start_time, id)` order. The index
//! is resolved at query time, so a concurrent rewrite of the list can make
//! the same index point at a different task between a read and a write.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Task;

/// List the tasks of a list ordered by start time, ties by insertion order.
///
/// Returns `None` when the list does not exist; an existing list with no
/// tasks yields `Some(vec![])`.
pub async fn list_tasks(pool: &PgPool, list_id: Uuid) -> Result<Option<Vec<Task>>> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM task_lists WHERE id = $1)")
            .bind(list_id)
            .fetch_one(pool)
            .await
            .context("failed to check task list existence")?;

    if !exists {
        return Ok(None);
    }

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE list_id = $1 ORDER BY start_time ASC, id ASC",
    )
    .bind(list_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks")?;

    Ok(Some(tasks))
}

/// Set the completion flag of the task at `task_index` in start-time order.
///
/// Index resolution and the update happen in one statement. Returns `false`
/// when the list does not exist or the index is outside `[0, len)`.
pub async fn update_task_completed(
    pool: &PgPool,
    list_id: Uuid,
    task_index: i64,
    completed: bool,
) -> Result<bool> {
    if task_index < 0 {
        return Ok(false);
    }

    let result = sqlx::query(
        "UPDATE tasks SET completed = $3 \
         WHERE id = ( \
             SELECT id FROM tasks \
             WHERE list_id = $1 \
             ORDER BY start_time ASC, id ASC \
             LIMIT 1 OFFSET $2 \
         )",
    )
    .bind(list_id)
    .bind(task_index)
    .bind(completed)
    .execute(pool)
    .await
    .context("failed to update task completion")?;

    Ok(result.rows_affected() == 1)
}
