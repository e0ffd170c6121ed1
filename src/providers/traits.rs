use async_trait::async_trait;
use anyhow::Result;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn new(api_key: String, system_message: String) -> Result<Self>
    where
        Self: Sized;

    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn get_model_info(&self) -> Result<String>;
}
