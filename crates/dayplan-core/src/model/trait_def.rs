//! The `LanguageModel` trait -- the one capability the planner needs.

use anyhow::Result;
use async_trait::async_trait;

/// A model that answers a user turn under a system instruction.
///
/// Object-safe so the service can hold it as `Arc<dyn LanguageModel>` and
/// tests can substitute canned replies.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn name(&self) -> &str;

    /// Send `user_text` with `system` as the system instruction and return
    /// the raw text of the reply.
    async fn prompt(&self, user_text: &str, system: &str) -> Result<String>;
}

// Compile-time assertion: LanguageModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn LanguageModel) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn prompt(&self, user_text: &str, system: &str) -> Result<String> {
            Ok(format!("{system}|{user_text}"))
        }
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let model: std::sync::Arc<dyn LanguageModel> = std::sync::Arc::new(EchoModel);
        assert_eq!(model.name(), "echo");
        assert_eq!(model.prompt("hi", "sys").await.unwrap(), "sys|hi");
    }
}
