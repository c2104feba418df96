//! System instructions for the model. Pure string construction, no I/O.

use super::types::ScheduledTask;

/// Field contract and example shared by both prompts.
const FORMAT_CONTRACT: &str = r#"You must respond with a valid JSON array of objects. Each object must have exactly these fields:
- "start_time": string in "HH:MM" format
- "end_time": string in "HH:MM" format
- "description": string with the task description

Example format:
[
    {"start_time": "09:00", "end_time": "09:45", "description": "Morning review"},
    {"start_time": "09:45", "end_time": "10:30", "description": "Email responses"}
]
"#;

const JSON_ONLY: &str = "IMPORTANT: Respond ONLY with the JSON array, no additional text.";

/// System instruction for turning a task description into a schedule that
/// begins at `start_time`.
pub fn planning_prompt(start_time: &str) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(&format!(
        "You are a helpful daily planner assistant. Given a list of tasks, \
         create a schedule for today starting at {start_time}. Break down the tasks into \
         manageable chunks and assign realistic time slots.\n\n"
    ));
    prompt.push_str(FORMAT_CONTRACT);
    prompt.push('\n');
    prompt.push_str(
        "Keep responses concise and practical. Include short breaks between tasks, \
         but do not add breaks before or after a task that is already a break.\n",
    );
    prompt.push_str(JSON_ONLY);

    prompt
}

/// Numbered rendering of a schedule, one task per line:
/// `1. 09:00-09:45: write report (completed)`.
pub fn render_schedule(tasks: &[ScheduledTask]) -> String {
    if tasks.is_empty() {
        return "(no tasks)".to_owned();
    }
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {}-{}: {} ({})",
                i + 1,
                t.start_time,
                t.end_time,
                t.description,
                if t.completed { "completed" } else { "pending" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System instruction for revising `current` according to `feedback`.
pub fn replanning_prompt(current: &[ScheduledTask], feedback: &str) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a helpful daily planner assistant. The user already has a schedule \
         for today and wants it adjusted.\n\n",
    );
    prompt.push_str("Current schedule:\n");
    prompt.push_str(&render_schedule(current));
    prompt.push_str("\n\n");
    prompt.push_str("User feedback:\n");
    prompt.push_str(feedback.trim());
    prompt.push_str("\n\n");
    prompt.push_str(
        "Produce the full revised schedule. Keep tasks marked (completed) unchanged \
         unless the feedback explicitly asks to change them. Keep short breaks between \
         tasks, but do not add breaks around a task that is already a break.\n\n",
    );
    prompt.push_str(FORMAT_CONTRACT);
    prompt.push('\n');
    prompt.push_str(JSON_ONLY);

    prompt
}
