use std::env;
use std::time::Duration;

/// Upper bound on any single call to an external service.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub fn request_timeout_from_env() -> Duration {
    let secs = env::var("REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .filter(|t: &u64| *t > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub models: Vec<String>,
    pub api_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env(provider: &str) -> Self {
        let prefix = provider.to_uppercase();

        // Get models from env or use defaults
        let models = env::var(format!("{}_MODELS", prefix))
            .map(|m| m.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_else(|_| Self::default_models(provider));

        // Get API URL from env or use default
        let api_url = env::var(format!("{}_API_URL", prefix))
            .unwrap_or_else(|_| Self::default_api_url(provider));

        // Low temperature keeps the JSON shape stable
        let temperature = env::var(format!("{}_TEMPERATURE", prefix))
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.4);

        Self {
            models,
            api_url,
            temperature,
            timeout: request_timeout_from_env(),
        }
    }

    /// Config pointing at an arbitrary endpoint, used for self-hosted gateways and tests.
    pub fn for_endpoint(provider: &str, api_url: impl Into<String>) -> Self {
        Self {
            models: Self::default_models(provider),
            api_url: api_url.into(),
            temperature: 0.4,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn primary_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    fn default_models(provider: &str) -> Vec<String> {
        match provider {
            "gemini" => vec!["gemini-1.5-flash".to_string(), "gemini-1.5-flash-8b".to_string()],
            "deepseek" => vec!["deepseek-chat".to_string()],
            _ => vec![],
        }
    }

    fn default_api_url(provider: &str) -> String {
        match provider {
            "gemini" => "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            "deepseek" => "https://api.deepseek.com/v1/chat/completions".to_string(),
            _ => String::new(),
        }
    }
}
