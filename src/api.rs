// HTTP API
// axum routes over the shared humanizer/detector state

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Mutex as TokioMutex;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    DetectRequest, DetectResponse, ErrorResponse, HealthResponse, HumanizeRequest, HumanizeResponse,
    ModelsConfigured, PreprocessRequest, PreprocessResponse, SentenceDetectResponse,
};
use crate::services::{
    detect_paragraphs, detect_sentences, preprocess_text, DetectionOptions, Detector, Humanizer, RewriteModel,
};

/// Process-wide state, built once at startup and shared by every handler.
pub struct AppState<R, D> {
    /// Locked for the whole humanize call: one pipeline run at a time.
    pub humanizer: TokioMutex<Humanizer<R>>,
    /// Cache size as of the last finished run; read by health without the lock.
    pub cache_entries: AtomicUsize,
    pub detector: D,
    pub detection: DetectionOptions,
    pub models: ModelsConfigured,
}

impl<R: RewriteModel, D> AppState<R, D> {
    pub fn new(humanizer: Humanizer<R>, detector: D, detection: DetectionOptions, models: ModelsConfigured) -> Self {
        Self {
            cache_entries: AtomicUsize::new(humanizer.cache().len()),
            humanizer: TokioMutex::new(humanizer),
            detector,
            detection,
            models,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

pub fn build_router<R, D>(state: Arc<AppState<R, D>>) -> Router
where
    R: RewriteModel + Send + Sync + 'static,
    D: Detector + Send + Sync + 'static,
{
    Router::new()
        .route("/api/humanize", post(humanize::<R, D>))
        .route("/api/detect", post(detect::<R, D>))
        .route("/api/detect/sentences", post(detect_sentences_handler::<R, D>))
        .route("/api/preprocess", post(preprocess))
        .route("/api/health", get(health::<R, D>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn humanize<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    Json(req): Json<HumanizeRequest>,
) -> Result<Json<HumanizeResponse>, ApiError>
where
    R: RewriteModel + Send + Sync + 'static,
    D: Detector + Send + Sync + 'static,
{
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text is required"));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(request_id = %request_id, chars = req.text.chars().count(), "api.humanize");

    let outcome = {
        let mut humanizer = state.humanizer.lock().await;
        let outcome = humanizer.humanize(&req.text, &req.scores).await;
        state
            .cache_entries
            .store(humanizer.cache().len(), Ordering::Relaxed);
        outcome
    };

    Ok(Json(HumanizeResponse::new(outcome, request_id)))
}

async fn detect<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    Json(req): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError>
where
    R: RewriteModel + Send + Sync + 'static,
    D: Detector + Send + Sync + 'static,
{
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text is required"));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(request_id = %request_id, chars = req.text.chars().count(), "api.detect");

    let report = detect_paragraphs(&state.detector, &req.text, state.detection).await;
    Ok(Json(DetectResponse::new(report, request_id)))
}

async fn detect_sentences_handler<R, D>(
    State(state): State<Arc<AppState<R, D>>>,
    Json(req): Json<DetectRequest>,
) -> Result<Json<SentenceDetectResponse>, ApiError>
where
    R: RewriteModel + Send + Sync + 'static,
    D: Detector + Send + Sync + 'static,
{
    if req.text.trim().is_empty() {
        return Err(ApiError::bad_request("Text is required"));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(request_id = %request_id, chars = req.text.chars().count(), "api.detect_sentences");

    let report = detect_sentences(&state.detector, &req.text, state.detection).await;
    Ok(Json(SentenceDetectResponse::new(report, request_id)))
}

async fn preprocess(Json(req): Json<PreprocessRequest>) -> Json<PreprocessResponse> {
    Json(PreprocessResponse {
        text: preprocess_text(&req.text),
    })
}

async fn health<R, D>(State(state): State<Arc<AppState<R, D>>>) -> Json<HealthResponse>
where
    R: RewriteModel + Send + Sync + 'static,
    D: Detector + Send + Sync + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        models_configured: state.models.clone(),
        cache_entries: state.cache_entries.load(Ordering::Relaxed),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
