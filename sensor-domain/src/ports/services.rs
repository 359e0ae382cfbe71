use async_trait::async_trait;

/// Turns a prompt into explanation text through a remote language model.
#[async_trait]
pub trait ExplanationService: Send + Sync {
    async fn explain(&self, prompt: &str) -> anyhow::Result<String>;
}
