//! Model metadata handler

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::models::{EXPECTED_COLUMNS, FEATURE_COUNT};

/// Documented label contract
pub const CLASS_LABELS: [(i64, &str); 2] = [(0, "counterfeit"), (1, "authentic")];

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_type: &'static str,
    pub scaler_type: &'static str,
    pub expected_columns: [&'static str; FEATURE_COUNT],
    pub classes: [i64; 2],
    pub class_labels: BTreeMap<String, &'static str>,
    pub n_features: usize,
}

pub async fn get(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let class_labels = CLASS_LABELS
        .iter()
        .map(|(class, label)| (class.to_string(), *label))
        .collect();

    Json(ModelInfoResponse {
        model_type: state.models.model_type(),
        scaler_type: state.models.scaler_type(),
        expected_columns: EXPECTED_COLUMNS,
        classes: state.models.classes(),
        class_labels,
        n_features: FEATURE_COUNT,
    })
}
