//! Fitted binary classifiers

use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::ModelError;

/// Trait for binary classifiers producing a probability per class
pub trait Classifier: Send + Sync {
    /// `n x 2` matrix, column `k` is the probability of `classes()[k]`
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError>;
    fn classes(&self) -> [i64; 2];
    fn n_features(&self) -> usize;
    fn type_name(&self) -> &'static str;
}

/// Binary logistic regression: `p(classes[1]) = sigmoid(x . coef + intercept)`
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array1<f64>,
    intercept: f64,
    classes: [i64; 2],
}

impl LogisticRegression {
    pub fn new(coef: Vec<f64>, intercept: f64, classes: [i64; 2]) -> Self {
        Self {
            coef: Array1::from(coef),
            intercept,
            classes,
        }
    }

    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.coef.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.coef.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.coef) + self.intercept)
    }
}

/// Logistic function, split on sign so `exp` never overflows
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        let decision = self.decision_function(x)?;

        let mut proba = Array2::zeros((decision.len(), 2));
        for (mut row, z) in proba.axis_iter_mut(Axis(0)).zip(decision.iter()) {
            let p1 = sigmoid(*z);
            row[0] = 1.0 - p1;
            row[1] = p1;
        }
        Ok(proba)
    }

    fn classes(&self) -> [i64; 2] {
        self.classes
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn type_name(&self) -> &'static str {
        "LogisticRegression"
    }
}
