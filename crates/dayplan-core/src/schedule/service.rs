//! Schedule service layer.
//!
//! Runs the plan / replan pipeline: format the system prompt, ask the model
//! (bounded by a timeout), sanitize and validate the reply, then write the
//! result in one storage transaction. Nothing is written unless validation
//! succeeds.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use dayplan_db::models::{NewTask, Task};
use dayplan_db::queries::{task_lists as list_queries, tasks as task_queries};

use super::parser::parse_schedule;
use super::prompt::{planning_prompt, replanning_prompt};
use super::sanitize::sanitize_response;
use super::types::{ScheduledTask, TaskDraft, carry_completion};
use crate::error::ScheduleError;
use crate::model::LanguageModel;

/// Settings injected into [`ScheduleService`] at construction.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Upper bound on one model call, whatever the model implementation.
    pub model_timeout: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(60),
        }
    }
}

/// Plans and re-plans task lists.
///
/// Cheap to clone; clones share the pool and the model.
#[derive(Clone)]
pub struct ScheduleService {
    pool: PgPool,
    model: Arc<dyn LanguageModel>,
    config: ScheduleConfig,
}

impl ScheduleService {
    pub fn new(pool: PgPool, model: Arc<dyn LanguageModel>, config: ScheduleConfig) -> Self {
        Self {
            pool,
            model,
            config,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Turn `description` into a schedule starting at `start_time` and store
    /// it as a new task list.
    ///
    /// Returns the drafts in the order the model gave them, and the new
    /// list id.
    pub async fn plan(
        &self,
        description: &str,
        start_time: &str,
    ) -> Result<(Vec<TaskDraft>, Uuid), ScheduleError> {
        info!(start_time, "planning schedule");

        let system = planning_prompt(start_time);
        let drafts = self.ask_model(description, &system).await?;

        let new_tasks: Vec<NewTask<'_>> = drafts.iter().map(TaskDraft::as_new_task).collect();
        let list_id = list_queries::create_task_list(&self.pool, &new_tasks).await?;

        info!(%list_id, tasks = drafts.len(), "schedule planned");
        Ok((drafts, list_id))
    }

    /// Revise an existing list according to `feedback`.
    ///
    /// `current` is the caller's view of the schedule and is what the model
    /// sees; storage is not re-read. Completion flags are carried onto the
    /// new tasks by position (see [`carry_completion`]), and the list's
    /// tasks are replaced wholesale.
    pub async fn replan(
        &self,
        list_id: Uuid,
        feedback: &str,
        current: &[ScheduledTask],
    ) -> Result<(Vec<TaskDraft>, Uuid), ScheduleError> {
        if list_queries::get_task_list(&self.pool, list_id)
            .await?
            .is_none()
        {
            warn!(%list_id, "replan requested for unknown task list");
            return Err(ScheduleError::list_not_found(list_id));
        }

        info!(%list_id, current = current.len(), "re-planning schedule");

        let system = replanning_prompt(current, feedback);
        let drafts = self.ask_model(feedback, &system).await?;

        let merged = carry_completion(&drafts, current);
        let rows: Vec<(NewTask<'_>, bool)> = merged
            .iter()
            .map(|t| (t.as_new_task(), t.completed))
            .collect();

        if !list_queries::replace_tasks(&self.pool, list_id, &rows).await? {
            return Err(ScheduleError::list_not_found(list_id));
        }

        info!(%list_id, tasks = drafts.len(), "schedule re-planned");
        Ok((drafts, list_id))
    }

    /// Tasks of a list in start-time order.
    pub async fn tasks(&self, list_id: Uuid) -> Result<Vec<Task>, ScheduleError> {
        task_queries::list_tasks(&self.pool, list_id)
            .await?
            .ok_or_else(|| ScheduleError::list_not_found(list_id))
    }

    /// Set the completion flag of the task at `task_index` in start-time
    /// order.
    pub async fn set_completed(
        &self,
        list_id: Uuid,
        task_index: i64,
        completed: bool,
    ) -> Result<(), ScheduleError> {
        if task_queries::update_task_completed(&self.pool, list_id, task_index, completed).await? {
            debug!(%list_id, task_index, completed, "task completion updated");
            return Ok(());
        }

        // Distinguish "no such list" from "no such index" for the message.
        match list_queries::get_task_list(&self.pool, list_id).await? {
            None => Err(ScheduleError::list_not_found(list_id)),
            Some(_) => Err(ScheduleError::task_not_found(list_id, task_index)),
        }
    }

    /// Call the model and turn its reply into validated drafts.
    async fn ask_model(&self, user_text: &str, system: &str) -> Result<Vec<TaskDraft>, ScheduleError> {
        let timeout = self.config.model_timeout;
        let raw = tokio::time::timeout(timeout, self.model.prompt(user_text, system))
            .await
            .map_err(|_| {
                anyhow!(
                    "model {} did not answer within {}s",
                    self.model.name(),
                    timeout.as_secs_f64()
                )
            })?
            .map_err(|e| e.context(format!("model {} request failed", self.model.name())))?;

        debug!(model = self.model.name(), raw = %raw, "raw model response");

        let drafts = parse_schedule(sanitize_response(&raw)).inspect_err(|e| {
            warn!(model = self.model.name(), error = %e, "model response rejected");
        })?;

        Ok(drafts)
    }
}
