use serde::{Deserialize, Serialize};

use dayplan_db::models::{NewTask, Task};

/// A task as proposed by the model: a time slot and what to do in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub description: String,
}

impl TaskDraft {
    pub fn as_new_task(&self) -> NewTask<'_> {
        NewTask {
            start_time: &self.start_time,
            end_time: &self.end_time,
            description: &self.description,
        }
    }
}

/// A [`TaskDraft`] with its completion flag, as shown to and sent back by
/// clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl ScheduledTask {
    pub fn from_draft(draft: TaskDraft, completed: bool) -> Self {
        Self {
            start_time: draft.start_time,
            end_time: draft.end_time,
            description: draft.description,
            completed,
        }
    }

    pub fn as_new_task(&self) -> NewTask<'_> {
        NewTask {
            start_time: &self.start_time,
            end_time: &self.end_time,
            description: &self.description,
        }
    }
}

impl From<Task> for ScheduledTask {
    fn from(task: Task) -> Self {
        Self {
            start_time: task.start_time,
            end_time: task.end_time,
            description: task.description,
            completed: task.completed,
        }
    }
}

/// Carry completion flags from `previous` onto `drafts` by array position.
///
/// Draft `i` takes `previous[i].completed`; drafts past the end of
/// `previous` start out pending. This is positional only: if the model
/// reorders, inserts or drops tasks, flags land on the wrong entries.
pub fn carry_completion(drafts: &[TaskDraft], previous: &[ScheduledTask]) -> Vec<ScheduledTask> {
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            let completed = previous.get(i).is_some_and(|p| p.completed);
            ScheduledTask::from_draft(draft.clone(), completed)
        })
        .collect()
}
