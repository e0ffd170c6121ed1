pub mod clarifai;
pub mod food_info;

use async_trait::async_trait;

use crate::food::capture::ImagePayload;
use crate::food::error::{LookupError, RecognitionError};
use crate::food::types::{FoodLabel, NutritionRecord};

// Re-export common types
pub use clarifai::ClarifaiClient;
pub use food_info::FoodInfoClient;

#[async_trait]
pub trait FoodRecognizer: Send + Sync {
    /// Never fails on an empty answer: that is the "Unknown Food" sentinel.
    async fn recognize(&self, image: &ImagePayload) -> Result<FoodLabel, RecognitionError>;
}

#[async_trait]
pub trait FoodInfoSource: Send + Sync {
    async fn lookup(&self, label: &FoodLabel) -> Result<NutritionRecord, LookupError>;
}
