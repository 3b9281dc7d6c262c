//! Prediction handlers

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};

use crate::{AppError, AppResult, AppState};
use crate::ingest::{records::{self, Record}, upload};
use crate::models::{PredictFileResponse, PredictResponse};

/// Multipart field carrying the CSV
const FILE_FIELD: &str = "file";

/// Score a JSON list of feature records
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Vec<Record>>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(records) = body.map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;

    let features = records::parse_features(&records)?;
    let predictions = state.models.predict(&features)?;

    tracing::debug!(rows = predictions.len(), "Scored JSON records");

    Ok(Json(PredictResponse::from(predictions)))
}

/// Score an uploaded CSV file
pub async fn predict_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictFileResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;

    let (filename, contents) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;

        let Some(field) = field else {
            return Err(AppError::ValidationError(format!(
                "Multipart form must contain a '{}' field",
                FILE_FIELD
            )));
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
        break (filename, contents);
    };

    let features = upload::parse_features(&contents)?;
    let predictions = state.models.predict(&features)?;

    tracing::info!(file = %filename, rows = predictions.len(), "Scored uploaded CSV");

    Ok(Json(PredictFileResponse {
        filename,
        total_samples: predictions.len(),
        predictions,
    }))
}
