//! Error taxonomy for planning operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the schedule service and the HTTP layer.
///
/// None of these are retried; each is reported to the caller as-is.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The task list identifier is not a valid UUID.
    #[error("invalid task list id: {0:?}")]
    InvalidIdentifier(String),

    /// Unknown task list, or a task index outside the list.
    #[error("{0}")]
    NotFound(String),

    /// The model reply is not valid JSON.
    #[error("failed to parse model response as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The model reply is JSON but not the expected shape.
    #[error("invalid response format: {0}")]
    Validation(String),

    /// Model call, timeout, or storage failure.
    #[error("error processing request: {0:#}")]
    Service(#[from] anyhow::Error),
}

impl ScheduleError {
    pub fn list_not_found(list_id: Uuid) -> Self {
        Self::NotFound(format!("task list {list_id} not found"))
    }

    pub fn task_not_found(list_id: Uuid, task_index: i64) -> Self {
        Self::NotFound(format!("task {task_index} not found in list {list_id}"))
    }

    /// Whether the caller, rather than the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_) | Self::NotFound(_))
    }
}

/// Parse a task list identifier supplied by a client.
pub fn parse_list_id(raw: &str) -> Result<Uuid, ScheduleError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ScheduleError::InvalidIdentifier(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_list_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_list_id_rejects_garbage() {
        let err = parse_list_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidIdentifier(ref s) if s == "not-a-uuid"));
        assert!(err.is_client_error());
    }

    #[test]
    fn service_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection refused").context("model request failed");
        let err = ScheduleError::from(inner);
        let msg = err.to_string();
        assert!(msg.contains("model request failed"), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
        assert!(!err.is_client_error());
    }

    #[test]
    fn not_found_messages_name_the_list() {
        let id = Uuid::nil();
        assert_eq!(
            ScheduleError::list_not_found(id).to_string(),
            format!("task list {id} not found")
        );
        assert!(ScheduleError::task_not_found(id, 7).to_string().contains("task 7"));
    }
}
