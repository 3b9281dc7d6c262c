//! Model artifacts
//!
//! The scaler and classifier are fitted by an external training pipeline and
//! exported as JSON documents holding their fitted parameters. Each document
//! carries a `type` tag naming the estimator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EXPECTED_COLUMNS, FEATURE_COUNT};
use super::classifier::{Classifier, LogisticRegression};
use super::scaler::{MinMaxScaler, Scaler, StandardScaler};

/// Output labels in probability-column order: 0 = counterfeit, 1 = authentic
pub const CLASSES: [i64; 2] = [0, 1];

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Exported scaler parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScalerArtifact {
    StandardScaler {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    MinMaxScaler {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

/// Exported classifier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClassifierArtifact {
    LogisticRegression {
        coef: Vec<f64>,
        intercept: f64,
        classes: Vec<i64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(ArtifactError::NotFound(display));
    }

    let raw = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;

    serde_json::from_slice(&raw).map_err(|source| ArtifactError::Parse {
        path: display,
        source,
    })
}

fn check_params(name: &str, values: &[f64]) -> Result<(), ArtifactError> {
    if values.len() != FEATURE_COUNT {
        return Err(ArtifactError::Invalid(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::Invalid(format!("{} contains non-finite values", name)));
    }
    Ok(())
}

fn check_feature_names(names: &Option<Vec<String>>) -> Result<(), ArtifactError> {
    if let Some(names) = names {
        if names.iter().map(String::as_str).ne(EXPECTED_COLUMNS.iter().copied()) {
            return Err(ArtifactError::Invalid(format!(
                "feature_names {:?} do not match expected columns {:?}",
                names, EXPECTED_COLUMNS
            )));
        }
    }
    Ok(())
}

impl ScalerArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        read_json(path.as_ref())
    }

    /// Validate parameters and build the runtime scaler
    pub fn into_scaler(self) -> Result<Box<dyn Scaler>, ArtifactError> {
        match self {
            ScalerArtifact::StandardScaler { mean, scale, feature_names } => {
                check_params("mean", &mean)?;
                check_params("scale", &scale)?;
                if scale.iter().any(|s| *s == 0.0) {
                    return Err(ArtifactError::Invalid("scale contains zero entries".to_string()));
                }
                check_feature_names(&feature_names)?;
                Ok(Box::new(StandardScaler::new(mean, scale)))
            }
            ScalerArtifact::MinMaxScaler { min, scale, feature_names } => {
                check_params("min", &min)?;
                check_params("scale", &scale)?;
                check_feature_names(&feature_names)?;
                Ok(Box::new(MinMaxScaler::new(min, scale)))
            }
        }
    }
}

impl ClassifierArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        read_json(path.as_ref())
    }

    /// Validate parameters and build the runtime classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactError> {
        match self {
            ClassifierArtifact::LogisticRegression { coef, intercept, classes, feature_names } => {
                check_params("coef", &coef)?;
                if !intercept.is_finite() {
                    return Err(ArtifactError::Invalid("intercept is not finite".to_string()));
                }
                if classes != CLASSES {
                    return Err(ArtifactError::Invalid(format!(
                        "classes must be {:?} (counterfeit, authentic), got {:?}",
                        CLASSES, classes
                    )));
                }
                check_feature_names(&feature_names)?;
                Ok(Box::new(LogisticRegression::new(coef, intercept, CLASSES)))
            }
        }
    }
}
