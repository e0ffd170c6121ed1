pub mod api;
pub mod commands;
pub mod config;
pub mod food;
pub mod providers;
pub mod session;

// Re-export commonly used items
pub use food::analysis::{AnalysisView, FoodAnalyzer};
pub use food::types::{FoodLabel, NutritionFacts, NutritionRecord};
pub use session::{SessionContext, SessionStore};
