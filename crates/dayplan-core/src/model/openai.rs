//! OpenAI-compatible chat completions client.
//!
//! Sends a non-streaming `/chat/completions` request with a system message
//! and a user message, and returns `choices[0].message.content`.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use super::config::ModelConfig;
use super::trait_def::LanguageModel;

pub struct OpenAiChatModel {
    config: ModelConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("model", &self.config.model)
            .field("api_url", &self.config.api_url)
            .finish()
    }
}

impl OpenAiChatModel {
    /// Build a client whose requests are bounded by `config.timeout`.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, user_text: &str, system: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user_text },
            ],
            "stream": false,
        })
    }
}

/// Pull the provider's error message out of an error body, if it has one.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

fn extract_content(reply: &serde_json::Value) -> Option<&str> {
    reply["choices"][0]["message"]["content"].as_str()
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn prompt(&self, user_text: &str, system: &str) -> Result<String> {
        let mut request = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(user_text, system));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("model request to {} failed", self.endpoint()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "model API returned HTTP {}: {}",
                status.as_u16(),
                extract_error_message(&body)
            ));
        }

        let reply: serde_json::Value = response
            .json()
            .await
            .context("model API returned a non-JSON body")?;

        let content = extract_content(&reply)
            .ok_or_else(|| anyhow!("model API reply has no message content"))?;

        debug!(model = %self.config.model, chars = content.len(), "model reply received");
        Ok(content.to_owned())
    }
}
