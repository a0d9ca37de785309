//! Routers for the report and video services.
//!
//! Layers run outermost first: access log, CORS, cache headers, body limit,
//! then the handler.

use axum::extract::DefaultBodyLimit;
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, Uri};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::{ReportContext, VideoContext};
use crate::config::MAX_UPLOAD_BYTES;

/// Lab report analysis, chat and health content.
pub fn report_router(ctx: ReportContext) -> Router {
    Router::new()
        .route("/analyze", post(endpoints::analyze::analyze))
        .route("/chat", post(endpoints::chat::send))
        .route(
            "/get_doctor_suggestions",
            post(endpoints::doctors::suggestions),
        )
        .route("/find_doctors", post(endpoints::doctors::find))
        .route(
            "/get_health_resources",
            get(endpoints::resources::health_resources),
        )
        .route(
            "/get_food_recommendations",
            post(endpoints::resources::food),
        )
        .fallback(not_found)
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Responses carry patient results.
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::access::log_access))
}

/// Topic-to-video generation.
pub fn video_router(ctx: VideoContext) -> Router {
    Router::new()
        .route("/generate", post(endpoints::video::generate))
        .route("/health", get(endpoints::health::check))
        .route("/test-script/:topic", get(endpoints::video::test_script))
        .fallback(not_found)
        .with_state(ctx)
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::access::log_access))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::charts::PlotlyRenderer;
    use crate::chat::ChatBot;
    use crate::pipeline::extraction::{MockImagePreprocessor, MockOcrEngine, ReportTextExtractor};
    use crate::pipeline::lab_values::{ReferenceTable, TEST_DEFINITIONS};
    use crate::video::merge::MockMerger;
    use crate::video::narrator::SilentNarrator;
    use crate::video::script::TemplateScriptGenerator;
    use crate::video::synth::MockSynthesizer;
    use crate::video::{VideoCapabilities, VideoPipeline};

    const BOUNDARY: &str = "labscope-test-boundary";

    fn report_ctx(ocr_text: &str) -> ReportContext {
        report_ctx_with(ReferenceTable::bundled().unwrap(), ocr_text)
    }

    fn report_ctx_with(reference: ReferenceTable, ocr_text: &str) -> ReportContext {
        let extractor = ReportTextExtractor::new(
            Box::new(MockOcrEngine::new(ocr_text)),
            Box::new(MockImagePreprocessor::new()),
        );
        ReportContext::new(
            reference,
            TEST_DEFINITIONS,
            Arc::new(extractor),
            Arc::new(PlotlyRenderer::seeded(7)),
            ChatBot::bundled().unwrap(),
        )
    }

    fn video_ctx(synth: MockSynthesizer) -> VideoContext {
        let pipeline = VideoPipeline::new(
            Box::new(TemplateScriptGenerator),
            Box::new(synth),
            Box::new(SilentNarrator),
            Box::new(MockMerger),
        );
        VideoContext::new(VideoCapabilities::from_pipeline(pipeline))
    }

    fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── Report service ──────────────────────────────────────

    #[tokio::test]
    async fn analyze_returns_full_report() {
        let app = report_router(report_ctx("Hemoglobin 11.2 g/dL"));
        let response = app.oneshot(upload_request("scan.png", b"fake-png")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");

        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        let hb = json["results"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["test"] == "Hemoglobin")
            .unwrap();
        assert_eq!(hb["value"], 11.2);
        assert_eq!(hb["status"], "Low");
        assert!(json["chart"]["bar"]["data"].is_array());
        assert!(json["insights"].as_array().unwrap().len() >= 1);
        assert_eq!(json["extracted_text"], "Hemoglobin 11.2 g/dL");
        assert!(json["food_recommendations"].get("Hemoglobin").is_some());
        assert!(json["doctor_recommendations"]["urgency"].is_string());
    }

    #[tokio::test]
    async fn analyze_without_values_is_400_with_debug_text() {
        let app = report_router(report_ctx("blurry page"));
        let response = app.oneshot(upload_request("scan.jpg", b"x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("No medical values detected"));
        assert_eq!(json["debug_text"], "blurry page");
    }

    #[tokio::test]
    async fn analyze_with_values_missing_from_reference_is_ok_and_empty() {
        let csv = "Test_Name,Min_Value,Max_Value,Unit,Description\nGlucose,70,100,mg/dL,Blood sugar\n";
        let reference = ReferenceTable::from_reader(csv.as_bytes(), "test").unwrap();
        let app = report_router(report_ctx_with(reference, "Hemoglobin 11.2 g/dL"));
        let response = app.oneshot(upload_request("scan.png", b"x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["results"], json!([]));
        assert!(json["chart"].is_null());
    }

    #[tokio::test]
    async fn oversize_upload_is_413() {
        let app = report_router(report_ctx("Hemoglobin 11.2"));
        let bytes = vec![b'x'; MAX_UPLOAD_BYTES + 10];
        let response = app.oneshot(upload_request("scan.png", &bytes)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            read_json(response).await["error"],
            "File too large. Maximum size is 16 MB"
        );
    }

    #[tokio::test]
    async fn analyze_rejects_wrong_extension() {
        let app = report_router(report_ctx("Hemoglobin 11.2"));
        let response = app.oneshot(upload_request("notes.txt", b"x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["error"], "Invalid file type. Please upload PNG, JPG, or PDF");
    }

    #[tokio::test]
    async fn analyze_without_file_field() {
        let app = report_router(report_ctx("Hemoglobin 11.2"));
        let response = app
            .oneshot(json_request("/analyze", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn analyze_with_empty_filename() {
        let app = report_router(report_ctx("Hemoglobin 11.2"));
        let response = app.oneshot(upload_request("", b"x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "No file selected");
    }

    #[tokio::test]
    async fn chat_answers_with_report_context() {
        let app = report_router(report_ctx(""));
        let body = json!({
            "question": "Why is my Hemoglobin low?",
            "report_data": {"results": [
                {"test": "Hemoglobin", "value": 10.0, "min": 12.0, "max": 16.0, "status": "Low"}
            ]}
        });
        let response = app.oneshot(json_request("/chat", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert!(!json["response"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn doctor_suggestions_need_results() {
        let app = report_router(report_ctx(""));
        let response = app
            .oneshot(json_request("/get_doctor_suggestions", json!({"results": []})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "No test results provided");
    }

    #[tokio::test]
    async fn emergency_results_include_warning_signs() {
        let app = report_router(report_ctx(""));
        let body = json!({"results": [
            {"test": "Troponin", "value": 0.5, "min": 0.0, "max": 0.04, "status": "High"}
        ]});
        let response = app
            .oneshot(json_request("/get_doctor_suggestions", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["recommendations"]["urgency"], "emergency");
        assert!(json["emergency_info"]["cardiac"]["signs"].is_array());
    }

    #[tokio::test]
    async fn routine_results_have_null_emergency_info() {
        let app = report_router(report_ctx(""));
        let body = json!({"results": [
            {"test": "Cholesterol", "value": 250.0, "min": 0.0, "max": 200.0, "status": "High"}
        ]});
        let response = app
            .oneshot(json_request("/get_doctor_suggestions", body))
            .await
            .unwrap();
        let json = read_json(response).await;
        assert_eq!(json["recommendations"]["urgency"], "routine");
        assert!(json["emergency_info"].is_null());
        assert_eq!(json["lifestyle"][0]["condition"], "High Cholesterol");
    }

    #[tokio::test]
    async fn find_doctors_defaults_to_primary_care() {
        let app = report_router(report_ctx(""));
        let response = app
            .oneshot(json_request("/find_doctors", json!({})))
            .await
            .unwrap();
        let json = read_json(response).await;
        assert_eq!(json["specialist"], "Primary Care Physician");
        assert_eq!(json["location"], "");
        assert!(json["keywords"]
            .as_array()
            .unwrap()
            .contains(&json!("family doctor")));
        assert!(json["search_urls"]["google"]
            .as_str()
            .unwrap()
            .starts_with("https://www.google.com/search"));
    }

    #[tokio::test]
    async fn food_recommendations_need_both_fields() {
        let app = report_router(report_ctx(""));
        let response = app
            .clone()
            .oneshot(json_request(
                "/get_food_recommendations",
                json!({"test_name": "Glucose"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Test name and status required");

        let response = app
            .oneshot(json_request(
                "/get_food_recommendations",
                json!({"test_name": "Glucose", "status": "High"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["test_name"], "Glucose");
        assert!(!json["recommendations"]["eat_less"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_resources_bundle() {
        let app = report_router(report_ctx(""));
        let response = app.oneshot(get_request("/get_health_resources")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["health_news"].as_array().unwrap().len(), 5);
        assert!(json["resources"]["general"].is_array());
        assert!(json["preventive_tips"]["nutrition"]["tips"].is_array());
        assert!(json["emergency_signs"]["stroke"].is_object());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let app = report_router(report_ctx(""));
        let response = app.oneshot(get_request("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["error"], "Not found: /nope");
    }

    // ── Video service ───────────────────────────────────────

    #[tokio::test]
    async fn video_health_has_fixed_shape() {
        let app = video_router(video_ctx(MockSynthesizer::new()));
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_json(response).await,
            json!({
                "status": "healthy",
                "models_loaded": {"gpt2": false, "text_to_video": false, "tts": false}
            })
        );
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn generate_requires_topic() {
        let app = video_router(video_ctx(MockSynthesizer::new()));
        let response = app.oneshot(form_request("topic=+++")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Topic is required");
    }

    #[tokio::test]
    async fn generate_returns_mp4_attachment() {
        let app = video_router(video_ctx(MockSynthesizer::new()));
        let response = app.oneshot(form_request("topic=water+cycle")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "video/mp4");
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"educational_video_water_cycle.mp4\""
        );
        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn generate_reports_missing_clips() {
        let app = video_router(video_ctx(MockSynthesizer::failing()));
        let response = app.oneshot(form_request("topic=volcanoes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            read_json(response).await["error"],
            "Failed to generate any video clips"
        );
    }

    #[tokio::test]
    async fn test_script_returns_scenes() {
        let app = video_router(video_ctx(MockSynthesizer::new()));
        let response = app
            .oneshot(get_request("/test-script/water%20cycle"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["topic"], "water cycle");
        assert_eq!(json["script"]["scenes"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn attachment_header_is_quoted_safely() {
        use crate::api::endpoints::video::attachment_header;
        assert_eq!(
            attachment_header("educational_video_\"x\"é.mp4"),
            "attachment; filename=\"educational_video__x__.mp4\""
        );
    }
}
