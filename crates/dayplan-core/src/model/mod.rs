//! Language model access.
//!
//! The planner needs exactly one capability from a model: answer a user
//! turn under a system instruction. [`LanguageModel`] captures that, and
//! [`OpenAiChatModel`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod config;
pub mod openai;
pub mod trait_def;

pub use config::ModelConfig;
pub use openai::OpenAiChatModel;
pub use trait_def::LanguageModel;
