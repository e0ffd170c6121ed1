use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::FoodRecognizer;
use crate::food::capture::ImagePayload;
use crate::food::config::FoodConfig;
use crate::food::error::RecognitionError;
use crate::food::types::FoodLabel;

/// Client for Clarifai's food-item-recognition model.
#[derive(Debug, Clone)]
pub struct ClarifaiClient {
    api_key: String,
    model_url: Url,
    client: Client,
}

impl ClarifaiClient {
    pub fn new(config: &FoodConfig) -> Result<Self, RecognitionError> {
        Self::with_endpoint(
            config.clarifai_api_key.clone(),
            config.clarifai_model_url.clone(),
            config.request_timeout,
        )
    }

    pub fn with_endpoint(api_key: String, model_url: Url, timeout: Duration) -> Result<Self, RecognitionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecognitionError::failed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model_url,
            client,
        })
    }

    /// Posts a base64 image and returns the model output untouched.
    pub async fn detect_raw(&self, base64_image: &str) -> Result<Value, RecognitionError> {
        let response = self
            .client
            .post(self.model_url.clone())
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&json!({
                "inputs": [{
                    "data": {
                        "image": { "base64": base64_image }
                    }
                }]
            }))
            .send()
            .await
            .map_err(|e| RecognitionError::failed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Clarifai request failed");
            return Err(RecognitionError::RecognitionFailed {
                status: Some(status.as_u16()),
                reason: format!("Clarifai API error: {}", status.canonical_reason().unwrap_or("unknown")),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RecognitionError::failed(format!("Failed to parse response: {}", e)))
    }
}

/// Name of the top concept, or the sentinel when the model returned none.
pub fn extract_label(result: &Value) -> FoodLabel {
    result
        .get("outputs")
        .and_then(|o| o.get(0))
        .and_then(|o| o.get("data"))
        .and_then(|d| d.get("concepts"))
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(FoodLabel::new)
        .unwrap_or_else(FoodLabel::unknown)
}

#[async_trait]
impl FoodRecognizer for ClarifaiClient {
    async fn recognize(&self, image: &ImagePayload) -> Result<FoodLabel, RecognitionError> {
        debug!(file = %image.file_name, size = image.bytes.len(), "submitting image for recognition");

        let result = self.detect_raw(&image.to_base64()).await?;
        let label = extract_label(&result);

        if label.is_unknown() {
            warn!(file = %image.file_name, "recognition returned no candidates");
        } else {
            info!(food = %label, "detected food");
        }
        Ok(label)
    }
}
