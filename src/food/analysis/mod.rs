pub mod charts;
pub mod nutrition;

pub use charts::AnalysisView;
pub use nutrition::{Analysis, FoodAnalyzer};
