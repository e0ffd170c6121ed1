use std::sync::Arc;
use tracing::{info, warn};

use crate::food::api::{FoodInfoSource, FoodRecognizer};
use crate::food::capture::ImagePayload;
use crate::food::error::PipelineError;
use crate::food::types::NutritionRecord;
use crate::session::{Route, SessionContext};

/// Result of one successful analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub record: NutritionRecord,
    /// Where the front end should go next.
    pub route: Route,
    /// The recognizer answered without candidates.
    pub low_confidence: bool,
}

/// Runs recognition then lookup, and hands the result to the session.
#[derive(Clone)]
pub struct FoodAnalyzer {
    recognizer: Arc<dyn FoodRecognizer>,
    info: Arc<dyn FoodInfoSource>,
    session: SessionContext,
}

impl FoodAnalyzer {
    pub fn new(
        recognizer: Arc<dyn FoodRecognizer>,
        info: Arc<dyn FoodInfoSource>,
        session: SessionContext,
    ) -> Self {
        Self {
            recognizer,
            info,
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn analyze_nutrition(&self, image: &ImagePayload) -> Result<Analysis, PipelineError> {
        info!(file = %image.file_name, "analyzing image");

        let label = self.recognizer.recognize(image).await.map_err(|e| {
            warn!(error = %e, "error processing image");
            e
        })?;

        let record = self.info.lookup(&label).await.map_err(|e| {
            warn!(food = %label, error = %e, "error getting food information");
            e
        })?;

        let route = self.session.publish(record.clone()).await;
        Ok(Analysis {
            record,
            route,
            low_confidence: label.is_unknown(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::api::food_info::scripted::{ScriptedProvider, APPLE_JSON};
    use crate::food::api::FoodInfoClient;
    use crate::food::error::{LookupError, RecognitionError};
    use crate::food::types::FoodLabel;
    use async_trait::async_trait;
    use image::ImageFormat;
    use parking_lot::Mutex;

    struct FixedRecognizer {
        answer: Result<FoodLabel, RecognitionError>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl FoodRecognizer for FixedRecognizer {
        async fn recognize(&self, _image: &ImagePayload) -> Result<FoodLabel, RecognitionError> {
            *self.calls.lock() += 1;
            self.answer.clone()
        }
    }

    fn image() -> ImagePayload {
        ImagePayload {
            bytes: vec![0xFF, 0xD8, 0xFF],
            format: ImageFormat::Jpeg,
            file_name: "camera-capture.jpg".to_string(),
        }
    }

    fn analyzer(
        answer: Result<FoodLabel, RecognitionError>,
        provider: ScriptedProvider,
    ) -> FoodAnalyzer {
        FoodAnalyzer::new(
            Arc::new(FixedRecognizer {
                answer,
                calls: Mutex::new(0),
            }),
            Arc::new(FoodInfoClient::new(Box::new(provider))),
            SessionContext::new(),
        )
    }

    #[tokio::test]
    async fn test_successful_analysis_is_published() {
        let analyzer = analyzer(Ok(FoodLabel::new("Apple")), ScriptedProvider::answering(APPLE_JSON));

        let analysis = analyzer.analyze_nutrition(&image()).await.unwrap();

        assert_eq!(analysis.route, Route::Analysis);
        assert!(!analysis.low_confidence);
        assert_eq!(analyzer.session().current(), Some(analysis.record));
    }

    #[tokio::test]
    async fn test_recognition_failure_skips_lookup() {
        let provider = ScriptedProvider::answering(APPLE_JSON);
        let analyzer = analyzer(Err(RecognitionError::failed("timeout")), provider.clone());

        let result = analyzer.analyze_nutrition(&image()).await;

        assert!(matches!(result, Err(PipelineError::Recognition(_))));
        assert!(provider.prompts.lock().is_empty());
        assert!(analyzer.session().current().is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_previous_record() {
        let analyzer = analyzer(Ok(FoodLabel::new("Apple")), ScriptedProvider::answering("not json"));
        let previous = crate::food::types::fixtures::apple();
        analyzer.session().publish(previous.clone()).await;

        let result = analyzer.analyze_nutrition(&image()).await;

        assert!(matches!(result, Err(PipelineError::Lookup(LookupError::ParseFailed(_)))));
        assert_eq!(analyzer.session().current(), Some(previous));
    }

    #[tokio::test]
    async fn test_unknown_food_is_looked_up_with_low_confidence() {
        let provider = ScriptedProvider::answering(APPLE_JSON);
        let analyzer = analyzer(Ok(FoodLabel::unknown()), provider.clone());

        let analysis = analyzer.analyze_nutrition(&image()).await.unwrap();

        assert!(analysis.low_confidence);
        assert!(provider.prompts.lock()[0].contains("Unknown Food"));
    }
}
