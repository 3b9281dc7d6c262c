//! Prediction request/response models

use serde::{Deserialize, Serialize};

/// One scored row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub prediction: i64,
    pub probability_class_0: f64,
    pub probability_class_1: f64,
    pub confidence: f64,
}

impl Prediction {
    /// Build from a probability pair; ties resolve to the first class
    pub fn from_probabilities(index: usize, classes: [i64; 2], p0: f64, p1: f64) -> Self {
        let prediction = if p1 > p0 { classes[1] } else { classes[0] };
        Self {
            index,
            prediction,
            probability_class_0: p0,
            probability_class_1: p1,
            confidence: p0.max(p1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
    pub total_samples: usize,
}

impl From<Vec<Prediction>> for PredictResponse {
    fn from(predictions: Vec<Prediction>) -> Self {
        let total_samples = predictions.len();
        Self { predictions, total_samples }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictFileResponse {
    pub filename: String,
    pub predictions: Vec<Prediction>,
    pub total_samples: usize,
}
