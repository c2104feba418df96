//! Scheduling: prompt formatting, reply sanitizing and parsing, and the
//! service that runs plan / replan against the model and storage.

pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod service;
pub mod types;

pub use parser::parse_schedule;
pub use prompt::{planning_prompt, render_schedule, replanning_prompt};
pub use sanitize::sanitize_response;
pub use service::{ScheduleConfig, ScheduleService};
pub use types::{ScheduledTask, TaskDraft, carry_completion};
