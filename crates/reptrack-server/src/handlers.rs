//! HTTP handlers for the frame endpoint

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reptrack_detector::{FrameRelay, FrameRequest};
use serde_json::json;

/// Frame submission and health routes
pub struct FrameRoutes;

impl FrameRoutes {
    #[must_use]
    pub fn routes(relay: Arc<FrameRelay>) -> Router {
        Router::new()
            .route("/api/process-frame", post(process_frame))
            .route("/health", get(health))
            .with_state(relay)
    }
}

/// `POST /api/process-frame`
///
/// Missing fields are a 400 and never reach the detector. Detector failures
/// still answer 200 with the fallback reading.
async fn process_frame(
    State(relay): State<Arc<FrameRelay>>,
    Json(request): Json<FrameRequest>,
) -> Response {
    match request.validate() {
        Ok(frame) => Json(relay.relay(&frame).await).into_response(),
        Err(e) => {
            log::warn!("Rejected frame request: {e}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "reptrack-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
