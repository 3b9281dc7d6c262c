//! Inference Engine
//!
//! Holds the fitted scaler and classifier for the lifetime of the process.
//! Loaded once at startup, read-only afterwards.

pub mod artifact;
pub mod classifier;
pub mod scaler;

use std::path::Path;

use ndarray::Axis;
use thiserror::Error;

use crate::models::{FeatureMatrix, Prediction, FEATURE_COUNT};

pub use artifact::{ArtifactError, ClassifierArtifact, ScalerArtifact};
pub use classifier::{Classifier, LogisticRegression};
pub use scaler::{MinMaxScaler, Scaler, StandardScaler};

/// Tolerance for the probability-pair sum
const PROBA_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Feature width mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model returned {actual} rows for {expected} inputs")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Model produced invalid probabilities at row {0}")]
    InvalidProbabilities(usize),
}

/// Scaler + classifier pair
pub struct ModelBundle {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl ModelBundle {
    pub fn new(scaler: Box<dyn Scaler>, classifier: Box<dyn Classifier>) -> Result<Self, ArtifactError> {
        if scaler.n_features() != FEATURE_COUNT || classifier.n_features() != FEATURE_COUNT {
            return Err(ArtifactError::Invalid(format!(
                "scaler expects {} features and classifier {}, input has {}",
                scaler.n_features(),
                classifier.n_features(),
                FEATURE_COUNT
            )));
        }
        Ok(Self { scaler, classifier })
    }

    pub fn from_artifacts(scaler: ScalerArtifact, classifier: ClassifierArtifact) -> Result<Self, ArtifactError> {
        Self::new(scaler.into_scaler()?, classifier.into_classifier()?)
    }

    /// Load both artifacts from disk
    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let scaler_path = scaler_path.as_ref();
        let model_path = model_path.as_ref();

        tracing::info!(path = %scaler_path.display(), "Loading scaler artifact");
        let scaler = ScalerArtifact::load(scaler_path)?;

        tracing::info!(path = %model_path.display(), "Loading classifier artifact");
        let classifier = ClassifierArtifact::load(model_path)?;

        let bundle = Self::from_artifacts(scaler, classifier)?;
        tracing::info!(
            scaler = bundle.scaler_type(),
            model = bundle.model_type(),
            classes = ?bundle.classes(),
            "Models loaded successfully"
        );
        Ok(bundle)
    }

    pub fn scaler_type(&self) -> &'static str {
        self.scaler.type_name()
    }

    pub fn model_type(&self) -> &'static str {
        self.classifier.type_name()
    }

    pub fn classes(&self) -> [i64; 2] {
        self.classifier.classes()
    }

    /// Scale, run inference and shape one result per input row
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Prediction>, ModelError> {
        let scaled = self.scaler.transform(features.values().view())?;
        let proba = self.classifier.predict_proba(scaled.view())?;

        if proba.nrows() != features.n_rows() {
            return Err(ModelError::RowCountMismatch {
                expected: features.n_rows(),
                actual: proba.nrows(),
            });
        }

        let classes = self.classes();
        proba
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(index, row)| {
                let (p0, p1) = (row[0], row[1]);
                let valid = p0.is_finite()
                    && p1.is_finite()
                    && (0.0..=1.0).contains(&p0)
                    && (0.0..=1.0).contains(&p1)
                    && (p0 + p1 - 1.0).abs() < PROBA_TOLERANCE;
                if !valid {
                    return Err(ModelError::InvalidProbabilities(index));
                }
                Ok(Prediction::from_probabilities(index, classes, p0, p1))
            })
            .collect()
    }

    /// Run a synthetic all-zero row through the full pipeline
    pub fn health_check(&self) -> Result<(), ModelError> {
        let probe = FeatureMatrix::zeros(1);
        let predictions = self.predict(&probe)?;
        if predictions.len() != 1 {
            return Err(ModelError::RowCountMismatch { expected: 1, actual: predictions.len() });
        }
        Ok(())
    }
}
