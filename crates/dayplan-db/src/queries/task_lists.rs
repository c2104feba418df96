//! Database query functions for the `task_lists` table.
//!
//! Whole-list writes (create, replace) run inside a single transaction so a
//! list is never observed with only part of its tasks.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{NewTask, TaskList};

/// Create a task list holding `tasks`, all marked not completed.
///
/// The list id is generated here and never reused. Either the list and every
/// task are stored, or nothing is.
pub async fn create_task_list(pool: &PgPool, tasks: &[NewTask<'_>]) -> Result<Uuid> {
    let list_id = Uuid::new_v4();
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("INSERT INTO task_lists (id) VALUES ($1)")
        .bind(list_id)
        .execute(&mut *tx)
        .await
        .context("failed to insert task list")?;

    for task in tasks {
        insert_task_row(&mut tx, list_id, task, false).await?;
    }

    tx.commit().await.context("failed to commit transaction")?;

    tracing::debug!(%list_id, tasks = tasks.len(), "task list created");
    Ok(list_id)
}

/// Fetch a task list row by id.
pub async fn get_task_list(pool: &PgPool, id: Uuid) -> Result<Option<TaskList>> {
    let list = sqlx::query_as::<_, TaskList>("SELECT * FROM task_lists WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task list")?;

    Ok(list)
}

/// Replace every task of an existing list with `tasks`, keeping each entry's
/// completion flag.
///
/// The list row is locked for the duration of the transaction. Returns
/// `false`, changing nothing, when the list does not exist.
pub async fn replace_tasks(
    pool: &PgPool,
    list_id: Uuid,
    tasks: &[(NewTask<'_>, bool)],
) -> Result<bool> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM task_lists WHERE id = $1 FOR UPDATE")
            .bind(list_id)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to lock task list")?;

    if locked.is_none() {
        // Transaction rolls back on drop.
        return Ok(false);
    }

    sqlx::query("DELETE FROM tasks WHERE list_id = $1")
        .bind(list_id)
        .execute(&mut *tx)
        .await
        .context("failed to delete previous tasks")?;

    for (task, completed) in tasks {
        insert_task_row(&mut tx, list_id, task, *completed).await?;
    }

    tx.commit().await.context("failed to commit transaction")?;

    tracing::debug!(%list_id, tasks = tasks.len(), "task list replaced");
    Ok(true)
}

async fn insert_task_row(
    conn: &mut PgConnection,
    list_id: Uuid,
    task: &NewTask<'_>,
    completed: bool,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO tasks (list_id, start_time, end_time, description, completed) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(list_id)
    .bind(task.start_time)
    .bind(task.end_time)
    .bind(task.description)
    .bind(completed)
    .execute(conn)
    .await
    .with_context(|| format!("failed to insert task {:?}", task.description))?;

    Ok(())
}
