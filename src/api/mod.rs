use axum::{
    routing::{get, post},
    Router,
    Json,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    http::StatusCode,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use validator::Validate;

use crate::food::analysis::{AnalysisView, FoodAnalyzer};
use crate::food::api::{ClarifaiClient, FoodInfoSource};
use crate::food::capture::ImagePayload;
use crate::food::error::{CaptureError, LookupError, PipelineError, RecognitionError};
use crate::food::types::{FoodLabel, NutritionRecord};
use crate::session::SessionContext;

/// Upper bound on request bodies; images arrive base64-encoded.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    detector: Arc<ClarifaiClient>,
    info: Arc<dyn FoodInfoSource>,
    analyzer: FoodAnalyzer,
    session: SessionContext,
}

impl AppState {
    pub fn new(detector: ClarifaiClient, info: Arc<dyn FoodInfoSource>, session: SessionContext) -> Self {
        let detector = Arc::new(detector);
        let analyzer = FoodAnalyzer::new(detector.clone(), info.clone(), session.clone());
        Self {
            detector,
            info,
            analyzer,
            session,
        }
    }

    pub fn analyzer(&self) -> &FoodAnalyzer {
        &self.analyzer
    }
}

#[derive(Deserialize, Validate)]
pub struct ImageRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    image: String,
}

#[derive(Deserialize, Validate)]
pub struct FoodInfoRequest {
    #[serde(default, rename = "foodName")]
    #[validate(length(min = 1))]
    food_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    route: &'static str,
    low_confidence: bool,
    record: NutritionRecord,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

/// Error body tagged with the failing stage so clients can react per kind.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.kind, "message": self.message })),
        )
            .into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        let message = error.to_string();
        match error {
            PipelineError::Capture(CaptureError::NoFileSelected(_)) => Self::bad_request("NoFileSelected", message),
            PipelineError::Capture(_) => Self::bad_request("CaptureFailed", message),
            PipelineError::Recognition(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                kind: "RecognitionFailed",
                message,
            },
            PipelineError::Lookup(LookupError::LookupFailed(_)) => Self {
                status: StatusCode::BAD_GATEWAY,
                kind: "LookupFailed",
                message,
            },
            PipelineError::Lookup(LookupError::ParseFailed(_)) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                kind: "ParseFailed",
                message,
            },
        }
    }
}

/// Accepts both bare base64 and `data:image/...;base64,` URLs.
fn strip_data_url(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => image,
    }
}

/// Create and configure the API router
pub fn create_api(state: AppState) -> Router {
    // Fully permissive CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api/detect-food", post(detect_food_handler))
        .route("/api/food-info", post(food_info_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analysis", get(analysis_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn detect_food_handler(
    State(state): State<AppState>,
    request: Result<Json<ImageRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) if request.validate().is_ok() => request,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Image is required" })),
            )
                .into_response()
        }
    };

    match state.detector.detect_raw(strip_data_url(&request.image)).await {
        Ok(result) => Json(result).into_response(),
        Err(RecognitionError::RecognitionFailed { status: Some(code), reason }) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": reason }))).into_response()
        }
        Err(e) => {
            warn!(error = %e, "food detection failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Food detection failed. Please try again." })),
            )
                .into_response()
        }
    }
}

async fn food_info_handler(
    State(state): State<AppState>,
    request: Result<Json<FoodInfoRequest>, JsonRejection>,
) -> Response {
    let food_name = match request {
        Ok(Json(request)) if request.validate().is_ok() && !request.food_name.trim().is_empty() => {
            request.food_name
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Food name is required" })),
            )
                .into_response()
        }
    };

    match state.info.lookup(&FoodLabel::new(food_name)).await {
        Ok(record) => Json(record).into_response(),
        Err(LookupError::ParseFailed(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to parse food information" })),
        )
            .into_response(),
        Err(LookupError::LookupFailed(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to get food information" })),
        )
            .into_response(),
    }
}

async fn analyze_handler(
    State(state): State<AppState>,
    request: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::bad_request("NoFileSelected", e.body_text()))?;
    request
        .validate()
        .map_err(|_| ApiError::bad_request("NoFileSelected", "Image is required"))?;

    let bytes = STANDARD
        .decode(strip_data_url(&request.image))
        .map_err(|e| ApiError::bad_request("NoFileSelected", format!("Image is not valid base64: {}", e)))?;
    let image = ImagePayload::from_bytes(bytes, "upload").map_err(PipelineError::from)?;

    let analysis = state.analyzer.analyze_nutrition(&image).await?;
    info!(food = %analysis.record.name, "analysis published");

    Ok(Json(AnalyzeResponse {
        route: analysis.route.path(),
        low_confidence: analysis.low_confidence,
        record: analysis.record,
    }))
}

async fn analysis_handler(State(state): State<AppState>) -> Json<AnalysisView> {
    let record = state.session.current();
    Json(AnalysisView::render(record.as_ref()))
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
}
