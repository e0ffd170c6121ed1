use async_trait::async_trait;
use anyhow::{Result, anyhow};
use crate::config::ProviderConfig;
use crate::providers::traits::CompletionProvider;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Clone)]
pub struct DeepSeekProvider {
    api_key: String,
    system_message: String,
    client: Client,
    model: String,
    config: ProviderConfig,
}

impl DeepSeekProvider {
    pub fn with_config(api_key: String, system_message: String, config: ProviderConfig) -> Result<Self> {
        let model = config
            .primary_model()
            .ok_or_else(|| anyhow!("No DeepSeek model configured"))?
            .to_string();
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            api_key,
            system_message,
            client,
            model,
            config,
        })
    }
}

#[async_trait]
impl CompletionProvider for DeepSeekProvider {
    async fn new(api_key: String, system_message: String) -> Result<Self> {
        Self::with_config(api_key, system_message, ProviderConfig::from_env("deepseek"))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, "sending DeepSeek chat completion request");

        let response = self.client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": self.system_message
                    },
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": self.config.temperature
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("API request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        // Check for API-level errors
        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Invalid response format"))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model.clone())
    }
}
