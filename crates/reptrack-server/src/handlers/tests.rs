use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use reptrack_detector::{encode_jpeg, DetectorSettings, FrameReading};
use std::path::PathBuf;
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// Helpers
// ============================================================================

fn relay(program: &str, script: PathBuf) -> Arc<FrameRelay> {
    Arc::new(FrameRelay::new(
        DetectorSettings {
            program: program.to_string(),
            script,
            timeout: Duration::from_secs(5),
        },
        1,
    ))
}

/// A relay whose detector can never be launched
fn broken_relay() -> Arc<FrameRelay> {
    relay(
        "reptrack-detector-that-does-not-exist",
        PathBuf::from("detector.py"),
    )
}

fn post_frame(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-frame")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_exercise_type_is_bad_request() {
    let app = FrameRoutes::routes(broken_relay());
    let (status, body) = send(app, post_frame(&json!({ "imageData": "aGVsbG8=" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing exerciseType");
}

#[tokio::test]
async fn test_empty_image_data_is_bad_request() {
    let app = FrameRoutes::routes(broken_relay());
    let (status, body) = send(
        app,
        post_frame(&json!({ "imageData": "", "exerciseType": "Squats" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing imageData");
}

#[tokio::test]
async fn test_malformed_json_is_client_error() {
    let app = FrameRoutes::routes(broken_relay());
    let request = Request::builder()
        .method("POST")
        .uri("/api/process-frame")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert!(status.is_client_error());
}

// ============================================================================
// Relaying
// ============================================================================

#[tokio::test]
async fn test_detector_failure_answers_fallback() {
    let app = FrameRoutes::routes(broken_relay());
    let (status, body) = send(
        app,
        post_frame(&json!({ "imageData": encode_jpeg(b"jpeg"), "exerciseType": "Push-ups" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let reading: FrameReading = serde_json::from_value(body).unwrap();
    assert_eq!(reading.count, 0);
    assert_eq!(reading.form_score, FrameReading::FALLBACK_FORM_SCORE);
    assert_eq!(reading.state, "ready");
    assert!(reading.timestamp > 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_detector_reading_is_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("detector.sh");
    std::fs::write(
        &script,
        "echo '{\"count\": 4, \"form_score\": 91.6, \"state\": \"down\", \"timestamp\": 1700000000000}'\n",
    )
    .unwrap();

    let app = FrameRoutes::routes(relay("sh", script));
    let (status, body) = send(
        app,
        post_frame(&json!({ "imageData": encode_jpeg(b"jpeg"), "exerciseType": "Squats" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 4);
    assert_eq!(body["form_score"], 92);
    assert_eq!(body["state"], "down");
    assert_eq!(body["timestamp"], 1_700_000_000_000_i64);
}

#[cfg(unix)]
#[tokio::test]
async fn test_rejected_request_never_runs_detector() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran");
    let script = dir.path().join("detector.sh");
    std::fs::write(&script, format!("touch '{}'\n", marker.display())).unwrap();

    let app = FrameRoutes::routes(relay("sh", script));
    let (status, _) = send(app, post_frame(&json!({ "exerciseType": "Squats" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!marker.exists());
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = FrameRoutes::routes(broken_relay());
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
