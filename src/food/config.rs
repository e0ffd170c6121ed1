use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::config::request_timeout_from_env;

pub const DEFAULT_CLARIFAI_MODEL_URL: &str =
    "https://api.clarifai.com/v2/models/food-item-recognition/outputs";

#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub clarifai_api_key: String,
    pub clarifai_model_url: Url,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl FoodConfig {
    pub fn from_env() -> Result<Self, String> {
        let clarifai_model_url = std::env::var("CLARIFAI_MODEL_URL")
            .unwrap_or_else(|_| DEFAULT_CLARIFAI_MODEL_URL.to_string());

        Ok(Self {
            clarifai_api_key: std::env::var("CLARIFAI_API_KEY")
                .map_err(|_| "CLARIFAI_API_KEY environment variable not set".to_string())?,
            clarifai_model_url: Url::parse(&clarifai_model_url)
                .map_err(|e| format!("Invalid CLARIFAI_MODEL_URL '{}': {}", clarifai_model_url, e))?,
            data_dir: std::env::var("NUTRISCAN_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            request_timeout: request_timeout_from_env(),
        })
    }
}
