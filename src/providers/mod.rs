pub mod deepseek;
pub mod gemini;
pub mod traits;

use anyhow::{Result, anyhow};
use std::env;

use self::deepseek::deepseek::DeepSeekProvider;
use self::gemini::gemini::GeminiProvider;
use self::traits::CompletionProvider;

/// Builds the generative-text provider named on the command line.
pub async fn create_provider(
    name: &str,
    system_message: String,
) -> Result<Box<dyn CompletionProvider + Send + Sync>> {
    let name = name.to_lowercase();
    if !matches!(name.as_str(), "gemini" | "deepseek") {
        return Err(anyhow!("Unknown provider '{}'. Available: gemini, deepseek", name));
    }

    let key_var = format!("{}_API_KEY", name.to_uppercase());
    let api_key = env::var(&key_var)
        .map_err(|_| anyhow!("{} environment variable not set", key_var))?;

    if name == "deepseek" {
        Ok(Box::new(DeepSeekProvider::new(api_key, system_message).await?))
    } else {
        Ok(Box::new(GeminiProvider::new(api_key, system_message).await?))
    }
}
