//! Fitted feature scalers

use ndarray::{Array1, Array2, ArrayView2};

use super::ModelError;

/// Trait for fitted feature transformations applied before inference
pub trait Scaler: Send + Sync {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError>;
    fn n_features(&self) -> usize;
    fn type_name(&self) -> &'static str;
}

fn check_width(x: &ArrayView2<'_, f64>, expected: usize) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            actual: x.ncols(),
        });
    }
    Ok(())
}

// ============================================================================
// STANDARD SCALER
// ============================================================================

/// `(x - mean) / scale`
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        }
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        check_width(&x, self.mean.len())?;

        let mut out = x.to_owned();
        out -= &self.mean;
        out /= &self.scale;
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn type_name(&self) -> &'static str {
        "StandardScaler"
    }
}

// ============================================================================
// MIN-MAX SCALER
// ============================================================================

/// `x * scale + min`, the fitted form of a min-max scaler
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    scale: Array1<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            min: Array1::from(min),
            scale: Array1::from(scale),
        }
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        check_width(&x, self.min.len())?;

        let mut out = x.to_owned();
        out *= &self.scale;
        out += &self.min;
        Ok(out)
    }

    fn n_features(&self) -> usize {
        self.min.len()
    }

    fn type_name(&self) -> &'static str {
        "MinMaxScaler"
    }
}
