//! HTTP routes of the prediction service.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use pricecast_core::{CoefficientSet, LatestData, PredictBody, PredictionReport, engine};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::data::HistorySource;
use crate::error::ApiError;
use crate::logging::RequestLoggerLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<dyn HistorySource>,
}

impl AppState {
    pub fn new(history: impl HistorySource + 'static) -> Self {
        Self { history: Arc::new(history) }
    }
}

/// Builds the API router.
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/data/latest", get(latest_data))
        .route("/api/predict", post(predict))
        .route("/api/coefficients/default", get(default_coefficients))
        .with_state(state);

    let router = if cors { router.layer(CorsLayer::permissive()) } else { router };
    router.layer(RequestLoggerLayer)
}

async fn index() -> Json<Value> {
    Json(json!({
        "name": "Pricecast Procurement Price API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "latest_data": "/api/data/latest",
            "predict": "/api/predict",
            "default_coefficients": "/api/coefficients/default",
        },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API is running" }))
}

async fn latest_data(State(state): State<AppState>) -> Result<Json<LatestData>, ApiError> {
    let history = state.history.load()?;
    Ok(Json(history.latest_data()))
}

async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<PredictionReport>, ApiError> {
    let body: PredictBody = if body.iter().all(u8::is_ascii_whitespace) {
        PredictBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?
    };
    let history = state.history.load()?;
    let report = engine::predict_body(&body, &history)?;
    debug!(mean = report.result.mean, "Prediction served");
    Ok(Json(report))
}

async fn default_coefficients() -> Json<CoefficientSet> {
    Json(CoefficientSet::model_defaults())
}
