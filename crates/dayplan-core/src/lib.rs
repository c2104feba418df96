//! Core planning logic: language model access, prompt construction, reply
//! parsing, and the schedule service that ties them to storage.

pub mod error;
pub mod model;
pub mod schedule;

pub use error::ScheduleError;
