//! Parse and validate a sanitized model reply into task drafts.
//!
//! The reply must be a JSON array whose elements are objects carrying
//! string `start_time`, `end_time` and `description` fields. Extra fields
//! are ignored.

use serde_json::{Map, Value};

use super::types::TaskDraft;
use crate::error::ScheduleError;

/// Parse `text` into drafts in reply order.
///
/// Malformed JSON yields [`ScheduleError::Parse`]; any shape problem yields
/// [`ScheduleError::Validation`] naming the offending element.
pub fn parse_schedule(text: &str) -> Result<Vec<TaskDraft>, ScheduleError> {
    let value: Value = serde_json::from_str(text)?;

    let Value::Array(items) = value else {
        return Err(ScheduleError::Validation(
            "response is not a JSON array".to_owned(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| draft_from_value(index, item))
        .collect()
}

fn draft_from_value(index: usize, item: &Value) -> Result<TaskDraft, ScheduleError> {
    let Some(object) = item.as_object() else {
        return Err(ScheduleError::Validation(format!(
            "task {index} is not a JSON object"
        )));
    };

    Ok(TaskDraft {
        start_time: string_field(object, index, "start_time")?,
        end_time: string_field(object, index, "end_time")?,
        description: string_field(object, index, "description")?,
    })
}

fn string_field(
    object: &Map<String, Value>,
    index: usize,
    name: &str,
) -> Result<String, ScheduleError> {
    match object.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ScheduleError::Validation(format!(
            "task {index} field {name:?} is not a string"
        ))),
        None => Err(ScheduleError::Validation(format!(
            "task {index} is missing required field {name:?}"
        ))),
    }
}
