pub mod analysis;
pub mod api;
pub mod capture;
pub mod config;
pub mod error;
pub mod types;

pub use error::{CaptureError, LookupError, PipelineError, RecognitionError};
pub use types::{FoodLabel, NutrientTable, NutritionFacts, NutritionRecord};
