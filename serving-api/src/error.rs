//! Error handling

use std::collections::BTreeMap;

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::inference::ModelError;
use crate::models::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Input errors
    EmptyInput(String),
    MissingColumns(Vec<String>),
    MissingValues(BTreeMap<String, usize>),
    ValidationError(String),

    // Extractor rejections (bad JSON, bad multipart, body too large)
    Rejected(StatusCode, String),

    // Model errors
    InferenceError(String),
    Unhealthy(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::EmptyInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MissingColumns(cols) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required columns: {}", cols.join(", ")),
            ),
            AppError::MissingValues(counts) => (
                StatusCode::BAD_REQUEST,
                ValidationError::MissingValues(counts.clone()).to_string(),
            ),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Rejected(status, msg) => (*status, msg.clone()),
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string())
            }
            AppError::Unhealthy(msg) => {
                tracing::error!("Health check failed: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Model health check failed".to_string())
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        match &self {
            AppError::MissingColumns(cols) => {
                body["missing_columns"] = json!(cols);
            }
            AppError::MissingValues(counts) => {
                body["missing_values"] = json!(counts);
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Empty(msg) => AppError::EmptyInput(msg),
            ValidationError::MissingColumns(cols) => AppError::MissingColumns(cols),
            ValidationError::MissingValues(counts) => AppError::MissingValues(counts),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::InferenceError(err.to_string())
    }
}
