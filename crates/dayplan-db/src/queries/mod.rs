//! Query functions, one module per table.

pub mod task_lists;
pub mod tasks;
