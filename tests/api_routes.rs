use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use nutriscan::api::{create_api, AppState};
use nutriscan::config::ProviderConfig;
use nutriscan::food::api::food_info::SYSTEM_MESSAGE;
use nutriscan::food::api::{ClarifaiClient, FoodInfoClient};
use nutriscan::providers::gemini::gemini::GeminiProvider;
use nutriscan::session::SessionContext;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APPLE_JSON: &str = r#"{
    "name": "Apple",
    "description": "A crisp fruit.",
    "nutrition": {
        "calories": 95, "protein": 0.5, "fat": 0.3, "carbs": 25,
        "sugar": 19, "fiber": 4.4, "sodium": 2,
        "vitamins": {"Vitamin C": 14},
        "minerals": {}
    },
    "origin": "Central Asia",
    "healthBenefits": ["Fiber"],
    "cookingMethods": ["Raw", "Baked"],
    "commonDishes": ["Apple pie"]
}"#;

// PNG signature followed by padding; enough for format sniffing.
const PNG_BASE64: &str = "iVBORw0KGgoAAAAA";

struct Upstreams {
    clarifai: MockServer,
    gemini: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            clarifai: MockServer::start().await,
            gemini: MockServer::start().await,
        }
    }

    async fn gemini_answers(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path("/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            })))
            .mount(&self.gemini)
            .await;
    }

    async fn clarifai_answers(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/v2/models/food-item-recognition/outputs"))
            .respond_with(response)
            .mount(&self.clarifai)
            .await;
    }

    fn app(&self) -> (Router, SessionContext) {
        let model_url = Url::parse(&format!(
            "{}/v2/models/food-item-recognition/outputs",
            self.clarifai.uri()
        ))
        .unwrap();
        let detector = ClarifaiClient::with_endpoint("clarifai-key".to_string(), model_url, Duration::from_secs(5)).unwrap();

        let provider = GeminiProvider::with_config(
            "gemini-key".to_string(),
            SYSTEM_MESSAGE.to_string(),
            ProviderConfig::for_endpoint("gemini", self.gemini.uri()),
        )
        .unwrap();
        let info = Arc::new(FoodInfoClient::new(Box::new(provider)));

        let session = SessionContext::new();
        (create_api(AppState::new(detector, info, session.clone())), session)
    }
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_food_info_requires_food_name() {
    let upstreams = Upstreams::start().await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/food-info", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Food name is required");
}

#[tokio::test]
async fn test_food_info_returns_record_from_fenced_answer() {
    let upstreams = Upstreams::start().await;
    upstreams.gemini_answers(&format!("```json\n{}\n```", APPLE_JSON)).await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/food-info", json!({"foodName": "Apple"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Apple");
    assert_eq!(body["imageUrl"], "/api/placeholder/400/300");
    assert_eq!(body["nutrition"]["calories"], 95.0);
}

#[tokio::test]
async fn test_food_info_unparseable_answer_is_server_error() {
    let upstreams = Upstreams::start().await;
    upstreams.gemini_answers("Sorry, I can't help with that.").await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/food-info", json!({"foodName": "Apple"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to parse food information");
}

#[tokio::test]
async fn test_detect_food_returns_raw_model_output() {
    let upstreams = Upstreams::start().await;
    upstreams
        .clarifai_answers(ResponseTemplate::new(200).set_body_json(json!({
            "outputs": [{"data": {"concepts": [{"name": "apple", "value": 0.98}]}}]
        })))
        .await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/detect-food", json!({"image": PNG_BASE64})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outputs"][0]["data"]["concepts"][0]["name"], "apple");
}

#[tokio::test]
async fn test_detect_food_passes_upstream_status_through() {
    let upstreams = Upstreams::start().await;
    upstreams.clarifai_answers(ResponseTemplate::new(429)).await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/detect-food", json!({"image": PNG_BASE64})).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("Clarifai"));
}

#[tokio::test]
async fn test_detect_food_requires_image() {
    let upstreams = Upstreams::start().await;
    let (app, _) = upstreams.app();

    let (status, _) = post_json(app, "/api/detect-food", json!({"image": ""})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_starts_without_data() {
    let upstreams = Upstreams::start().await;
    let (app, _) = upstreams.app();

    let (status, body) = get_json(app, "/api/analysis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "noData");
}

#[tokio::test]
async fn test_analyze_publishes_record_for_analysis_screen() {
    let upstreams = Upstreams::start().await;
    upstreams
        .clarifai_answers(ResponseTemplate::new(200).set_body_json(json!({
            "outputs": [{"data": {"concepts": [{"name": "apple"}]}}]
        })))
        .await;
    upstreams.gemini_answers(APPLE_JSON).await;
    let (app, session) = upstreams.app();

    let (status, body) = post_json(
        app.clone(),
        "/api/analyze",
        json!({"image": format!("data:image/png;base64,{}", PNG_BASE64)}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"], "/analysis");
    assert_eq!(body["lowConfidence"], false);
    assert_eq!(session.current().map(|r| r.name), Some("Apple".to_string()));

    let (_, view) = get_json(app, "/api/analysis").await;
    assert_eq!(view["state"], "dashboard");
    assert_eq!(view["tabs"], json!(["macros", "vitamins"]));
    assert_eq!(view["macros"][6]["value"], 0.2);
}

#[tokio::test]
async fn test_analyze_reports_recognition_failure_kind() {
    let upstreams = Upstreams::start().await;
    upstreams.clarifai_answers(ResponseTemplate::new(500)).await;
    let (app, session) = upstreams.app();

    let (status, body) = post_json(app, "/api/analyze", json!({"image": PNG_BASE64})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "RecognitionFailed");
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_analyze_rejects_non_image_payload() {
    let upstreams = Upstreams::start().await;
    let (app, _) = upstreams.app();

    let (status, body) = post_json(app, "/api/analyze", json!({"image": "aGVsbG8gd29ybGQ="})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NoFileSelected");
}
