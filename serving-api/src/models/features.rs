//! Feature record model
//!
//! The six geometric measurements the classifier was fitted on, and the
//! validation that turns loosely-typed input (JSON objects, CSV cells) into a
//! dense feature matrix.

use std::collections::BTreeMap;

use ndarray::Array2;
use thiserror::Error;

/// Required input columns, in the order the scaler and classifier expect.
pub const EXPECTED_COLUMNS: [&str; FEATURE_COUNT] = [
    "diagonal",
    "height_left",
    "height_right",
    "margin_low",
    "margin_up",
    "length",
];

pub const FEATURE_COUNT: usize = 6;

/// Cell text treated as a missing value.
const MISSING_TOKENS: [&str; 7] = ["NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// One raw input cell before numeric validation
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Invalid(String),
}

impl Cell {
    /// Interpret a CSV cell (or a JSON string value)
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() || MISSING_TOKENS.contains(&text) {
            return Cell::Missing;
        }

        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            Ok(_) => Cell::Invalid(text.to_string()),
            Err(_) => Cell::Invalid(text.to_string()),
        }
    }

    /// Interpret a JSON value (`None` = key absent)
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        use serde_json::Value;

        match value {
            None | Some(Value::Null) => Cell::Missing,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Cell::Number(v),
                _ => Cell::Invalid(n.to_string()),
            },
            Some(Value::String(s)) => Cell::parse(s),
            Some(other) => Cell::Invalid(other.to_string()),
        }
    }
}

pub type RawRow = [Cell; FEATURE_COUNT];

/// Input validation failures (all map to 4xx)
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0}")]
    Empty(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Missing values in required columns: {}", describe_missing(.0))]
    MissingValues(BTreeMap<String, usize>),

    #[error("Invalid value '{value}' in column '{column}' at row {row}: expected a number")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("{0}")]
    Unreadable(String),
}

fn describe_missing(missing: &BTreeMap<String, usize>) -> String {
    missing
        .iter()
        .map(|(column, rows)| format!("{} ({} row{})", column, rows, if *rows == 1 { "" } else { "s" }))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Expected columns absent from `present`, in canonical order
pub fn missing_columns<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = present.into_iter().collect();
    EXPECTED_COLUMNS
        .iter()
        .filter(|col| !present.contains(col))
        .map(|col| col.to_string())
        .collect()
}

/// Validated `n x 6` matrix of raw (unscaled) features
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Check every row for missing or non-numeric cells.
    ///
    /// Missing values are reported for all columns at once; invalid values
    /// are reported for the first offending cell.
    pub fn from_rows(rows: Vec<RawRow>) -> Result<Self, ValidationError> {
        if rows.is_empty() {
            return Err(ValidationError::Empty("Input contains no rows".to_string()));
        }

        let mut missing: BTreeMap<String, usize> = BTreeMap::new();
        for row in &rows {
            for (col, cell) in EXPECTED_COLUMNS.iter().zip(row.iter()) {
                if *cell == Cell::Missing {
                    *missing.entry(col.to_string()).or_default() += 1;
                }
            }
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingValues(missing));
        }

        let mut data = Vec::with_capacity(rows.len() * FEATURE_COUNT);
        for (idx, row) in rows.iter().enumerate() {
            for (col, cell) in EXPECTED_COLUMNS.iter().zip(row.iter()) {
                match cell {
                    Cell::Number(v) => data.push(*v),
                    Cell::Invalid(text) => {
                        return Err(ValidationError::InvalidValue {
                            column: col.to_string(),
                            row: idx,
                            value: text.clone(),
                        })
                    }
                    Cell::Missing => {}
                }
            }
        }

        let values = Array2::from_shape_vec((rows.len(), FEATURE_COUNT), data)
            .map_err(|e| ValidationError::Unreadable(e.to_string()))?;

        Ok(Self { values })
    }

    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    /// One all-zero row, used by the health probe
    pub fn zeros(rows: usize) -> Self {
        Self { values: Array2::zeros((rows, FEATURE_COUNT)) }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}
