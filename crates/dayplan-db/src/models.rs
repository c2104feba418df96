use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A task list -- the schedule produced by one planning session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskList {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One scheduled task inside a [`TaskList`].
///
/// `id` is a storage surrogate. Callers address tasks by their position in
/// `(start_time, id)` order, never by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub list_id: Uuid,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub description: String,
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Insert parameters
// ---------------------------------------------------------------------------

/// Parameters for inserting a task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTask<'a> {
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub description: &'a str,
}
