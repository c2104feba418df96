use std::fmt;
use std::time::Duration;

/// Connection settings for the language model API.
///
/// Built once at startup and handed to the model client; nothing reads
/// these values from the environment at call time.
#[derive(Clone)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token. Omitted from requests when `None`.
    pub api_key: Option<String>,
    /// Base URL including the version segment, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// Upper bound on a single model request.
    pub timeout: Duration,
}

impl ModelConfig {
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
    pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Environment variables consulted when resolving configuration.
    pub const MODEL_ENV: &str = "DAYPLAN_LLM_MODEL";
    pub const API_KEY_ENV: &str = "DAYPLAN_LLM_API_KEY";
    pub const API_URL_ENV: &str = "DAYPLAN_LLM_API_URL";
    pub const TIMEOUT_ENV: &str = "DAYPLAN_LLM_TIMEOUT_SECS";
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_owned(),
            api_key: None,
            api_url: Self::DEFAULT_API_URL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
