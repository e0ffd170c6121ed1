use async_trait::async_trait;
use anyhow::{Result, anyhow};
use crate::config::ProviderConfig;
use crate::providers::traits::CompletionProvider;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    system_message: String,
    client: Client,
    model: String,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn with_config(api_key: String, system_message: String, config: ProviderConfig) -> Result<Self> {
        let model = config
            .primary_model()
            .ok_or_else(|| anyhow!("No Gemini model configured"))?
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

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn new(api_key: String, system_message: String) -> Result<Self> {
        Self::with_config(api_key, system_message, ProviderConfig::from_env("gemini"))
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, "sending Gemini generateContent request");

        let response = self.client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{
                        "text": format!("{}\n{}", self.system_message, prompt)
                    }]
                }],
                "generationConfig": {
                    "temperature": self.config.temperature
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Invalid response format"))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model.clone())
    }
}
