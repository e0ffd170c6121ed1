use async_trait::async_trait;
use tracing::{debug, info, warn};
use validator::Validate;

use super::FoodInfoSource;
use crate::food::error::LookupError;
use crate::food::types::{FoodLabel, NutritionRecord, PLACEHOLDER_IMAGE_URL};
use crate::providers::traits::CompletionProvider;

pub const SYSTEM_MESSAGE: &str =
    "You are a nutrition database. You answer with a single JSON document and nothing else.";

/// Looks up a NutritionRecord for a label through a generative-text provider.
pub struct FoodInfoClient {
    provider: Box<dyn CompletionProvider + Send + Sync>,
}

impl FoodInfoClient {
    pub fn new(provider: Box<dyn CompletionProvider + Send + Sync>) -> Self {
        Self { provider }
    }

    pub async fn model(&self) -> String {
        self.provider
            .get_model_info()
            .await
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

pub fn build_prompt(food_name: &str) -> String {
    format!(
        r#"Provide detailed information about {food} as a food item.
Return the response in JSON format with the following structure:
{{
  "name": "{food}",
  "description": "Detailed description of the food in 250 words",
  "nutrition": {{
    "calories": number,
    "protein": number (in grams),
    "fat": number (in grams),
    "carbs": number (in grams),
    "sugar": number (in grams),
    "fiber": number (in grams),
    "sodium": number (in milligrams),
    "vitamins": {{
      "Vitamin A": number (% of daily value),
      "Vitamin C": number (% of daily value),
      "Vitamin D": number (% of daily value),
      "Vitamin E": number (% of daily value),
      "Vitamin K": number (% of daily value)
    }},
    "minerals": {{
      "Calcium": number (% of daily value),
      "Iron": number (% of daily value),
      "Potassium": number (% of daily value),
      "Magnesium": number (% of daily value),
      "Zinc": number (% of daily value)
    }}
  }},
  "origin": "Geographic origin of the food",
  "healthBenefits": ["Benefit 1", "Benefit 2", "Benefit 3", "Benefit 4", "Benefit 5", "Benefit 6"],
  "cookingMethods": ["Method 1", "Method 2", "Method 3"],
  "commonDishes": ["Dish 1", "Dish 2", "Dish 3"]
}}
Make sure all numbers are realistic and based on nutritional data for a typical serving.
Do not include any explanations or additional text outside the JSON structure."#,
        food = food_name
    )
}

/// Removes markdown code-fence markers around a model answer.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses a model answer into a validated record.
///
/// The text is untrusted: any shape mismatch or out-of-range number is a
/// `ParseFailed`.
pub fn parse_record(raw: &str) -> Result<NutritionRecord, LookupError> {
    let cleaned = strip_code_fences(raw);

    let mut record: NutritionRecord = serde_json::from_str(&cleaned).map_err(|e| {
        warn!(error = %e, response = %cleaned, "error parsing food information");
        LookupError::ParseFailed(e.to_string())
    })?;

    record.validate().map_err(|e| {
        warn!(error = %e, "food information failed validation");
        LookupError::ParseFailed(e.to_string())
    })?;

    record.image_url = Some(PLACEHOLDER_IMAGE_URL.to_string());
    Ok(record)
}

#[async_trait]
impl FoodInfoSource for FoodInfoClient {
    async fn lookup(&self, label: &FoodLabel) -> Result<NutritionRecord, LookupError> {
        let food_name = label.as_str().trim();
        if food_name.is_empty() {
            return Err(LookupError::LookupFailed("Food name is required".to_string()));
        }

        debug!(food = food_name, "requesting food information");
        let raw = self
            .provider
            .complete(&build_prompt(food_name))
            .await
            .map_err(|e| {
                warn!(food = food_name, error = %e, "error calling generative API");
                LookupError::LookupFailed(e.to_string())
            })?;

        let record = parse_record(&raw)?;
        info!(food = %record.name, calories = record.nutrition.calories, "food information received");
        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::{ScriptedProvider, APPLE_JSON};
    use super::*;
    use crate::config::ProviderConfig;
    use crate::providers::gemini::gemini::GeminiProvider;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(provider: ScriptedProvider) -> FoodInfoClient {
        FoodInfoClient::new(Box::new(provider))
    }

    #[tokio::test]
    async fn test_lookup_parses_record_and_adds_placeholder_image() {
        let provider = ScriptedProvider::answering(APPLE_JSON);
        let record = client(provider.clone()).lookup(&FoodLabel::new("Apple")).await.unwrap();

        assert_eq!(record.name, "Apple");
        assert_eq!(record.image_url.as_deref(), Some(PLACEHOLDER_IMAGE_URL));
        assert!(provider.prompts.lock()[0].contains("information about Apple"));
    }

    #[tokio::test]
    async fn test_fenced_answer_parses_like_plain_answer() {
        let fenced = format!("```json\n{}\n```", APPLE_JSON);
        let plain = client(ScriptedProvider::answering(APPLE_JSON))
            .lookup(&FoodLabel::new("Apple"))
            .await
            .unwrap();
        let unwrapped = client(ScriptedProvider::answering(&fenced))
            .lookup(&FoodLabel::new("Apple"))
            .await
            .unwrap();

        assert_eq!(plain, unwrapped);
    }

    #[test]
    fn test_strip_code_fences_is_idempotent() {
        let once = strip_code_fences("```json\n{\"a\": 1}\n```");
        assert_eq!(once, "{\"a\": 1}");
        assert_eq!(strip_code_fences(&once), once);
    }

    #[tokio::test]
    async fn test_prose_answer_is_parse_failure() {
        let result = client(ScriptedProvider::answering("Apples are delicious!"))
            .lookup(&FoodLabel::new("Apple"))
            .await;
        assert!(matches!(result, Err(LookupError::ParseFailed(_))));
    }

    #[tokio::test]
    async fn test_negative_values_are_parse_failure() {
        let answer = APPLE_JSON.replace("\"fat\": 0.3", "\"fat\": -0.3");
        let result = client(ScriptedProvider::answering(&answer))
            .lookup(&FoodLabel::new("Apple"))
            .await;
        assert!(matches!(result, Err(LookupError::ParseFailed(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_is_lookup_failure() {
        let result = client(ScriptedProvider::failing())
            .lookup(&FoodLabel::new("Apple"))
            .await;
        assert!(matches!(result, Err(LookupError::LookupFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_label_never_reaches_provider() {
        let provider = ScriptedProvider::answering(APPLE_JSON);
        let result = client(provider.clone()).lookup(&FoodLabel::new("  ")).await;

        assert!(matches!(result, Err(LookupError::LookupFailed(_))));
        assert!(provider.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_provider_is_lookup_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "candidates": [{"content": {"parts": [{"text": APPLE_JSON}]}}]
                    }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let mut config = ProviderConfig::for_endpoint("gemini", mock_server.uri());
        config.timeout = Duration::from_millis(100);
        let provider = GeminiProvider::with_config("gemini-key".to_string(), SYSTEM_MESSAGE.to_string(), config).unwrap();

        let result = FoodInfoClient::new(Box::new(provider)).lookup(&FoodLabel::new("Apple")).await;

        assert!(matches!(result, Err(LookupError::LookupFailed(_))));
    }
}
