//! Liveness and health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};
use crate::models::EXPECTED_COLUMNS;

#[derive(Serialize)]
pub struct IndexResponse {
    message: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
    timestamp: i64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    models_loaded: bool,
    expected_columns: [&'static str; 6],
    timestamp: i64,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Banknote authentication API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "GET /health",
            "GET /model_info",
            "POST /predict",
            "POST /predict_file",
            "GET /",
        ],
        timestamp: chrono::Utc::now().timestamp(),
    })
}

/// Score a synthetic all-zero row through scaler and classifier
pub async fn check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    state.models
        .health_check()
        .map_err(|e| AppError::Unhealthy(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy",
        models_loaded: true,
        expected_columns: EXPECTED_COLUMNS,
        timestamp: chrono::Utc::now().timestamp(),
    }))
}
