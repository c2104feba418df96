//! Terminal handlers for `dayplan plan` and `dayplan show`.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use dayplan_core::schedule::{ScheduleService, TaskDraft};
use dayplan_db::queries::tasks as task_queries;

// -----------------------------------------------------------------------
// dayplan plan <description> --start HH:MM
// -----------------------------------------------------------------------

/// Ask the model for a schedule, store it, and print it with the new list id.
pub async fn run_plan(service: &ScheduleService, description: &str, start: &str) -> Result<()> {
    let (drafts, list_id) = service
        .plan(description, start)
        .await
        .context("failed to plan schedule")?;

    println!("Planned {} task(s) starting at {start}.", drafts.len());
    println!();
    print_drafts(&drafts);
    println!();
    println!("  List ID: {list_id}");
    println!();
    println!("Next: run `dayplan show {list_id}` to view progress.");

    Ok(())
}

fn print_drafts(drafts: &[TaskDraft]) {
    for (i, task) in drafts.iter().enumerate() {
        println!(
            "  {i:>2}. {}-{}  {}",
            task.start_time, task.end_time, task.description
        );
    }
}

// -----------------------------------------------------------------------
// dayplan show <list_id>
// -----------------------------------------------------------------------

/// Print a stored list in start-time order with completion marks.
pub async fn run_show(pool: &PgPool, list_id_str: &str) -> Result<()> {
    let list_id = Uuid::parse_str(list_id_str.trim())
        .with_context(|| format!("invalid task list ID: {list_id_str}"))?;

    let tasks = task_queries::list_tasks(pool, list_id)
        .await?
        .with_context(|| format!("task list {list_id} not found"))?;

    let done = tasks.iter().filter(|t| t.completed).count();
    println!("Task list: {list_id}");
    println!("Progress: {done}/{} completed", tasks.len());
    println!();

    if tasks.is_empty() {
        println!("  (no tasks)");
        return Ok(());
    }

    for (i, task) in tasks.iter().enumerate() {
        let mark = if task.completed { "x" } else { " " };
        println!(
            "  [{mark}] {i:>2}. {}-{}  {}",
            task.start_time, task.end_time, task.description
        );
    }

    Ok(())
}
