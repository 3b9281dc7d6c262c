//! Prediction report: merged table, aggregate counts, status filter

use crate::client::PredictFileResponse;
use crate::constants::{
    CONFIDENCE_COLUMN, LABEL_AUTHENTIC, LABEL_COUNTERFEIT, PREDICTION_COLUMN, STATUS_COLUMN,
};
use crate::table::Table;

/// Human-readable status derived from the label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Authentic,
    Counterfeit,
}

impl Status {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            LABEL_AUTHENTIC => Some(Status::Authentic),
            LABEL_COUNTERFEIT => Some(Status::Counterfeit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Authentic => "Authentic",
            Status::Counterfeit => "Counterfeit",
        }
    }
}

/// Row filter offered on the results table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Authentic,
    Counterfeit,
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Authentic => status == Status::Authentic,
            StatusFilter::Counterfeit => status == Status::Counterfeit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub authentic: usize,
    pub counterfeit: usize,
    /// Percentage of counterfeit notes, 0 for an empty table
    pub fraud_rate: f64,
}

impl Summary {
    pub fn from_statuses(statuses: &[Status]) -> Self {
        let total = statuses.len();
        let authentic = statuses.iter().filter(|s| **s == Status::Authentic).count();
        let counterfeit = total - authentic;
        let fraud_rate = if total > 0 {
            counterfeit as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self { total, authentic, counterfeit, fraud_rate }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    CountMismatch { rows: usize, predictions: usize },
    BadIndex(usize),
    UnknownLabel(i64),
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountMismatch { rows, predictions } => {
                write!(f, "API returned {} predictions for {} rows", predictions, rows)
            }
            Self::BadIndex(idx) => write!(f, "API returned a prediction for unknown row {}", idx),
            Self::UnknownLabel(label) => write!(f, "API returned unknown label {}", label),
        }
    }
}

impl std::error::Error for MergeError {}

/// Uploaded table with predictions merged in
#[derive(Debug, Clone)]
pub struct Report {
    table: Table,
    statuses: Vec<Status>,
    summary: Summary,
}

impl Report {
    /// Merge per-row labels into the uploaded table
    pub fn merge(mut table: Table, response: &PredictFileResponse) -> Result<Self, MergeError> {
        let rows = table.len();
        if response.predictions.len() != rows || response.total_samples != rows {
            return Err(MergeError::CountMismatch {
                rows,
                predictions: response.predictions.len(),
            });
        }

        let mut labels: Vec<Option<(i64, f64)>> = vec![None; rows];
        for p in &response.predictions {
            let slot = labels.get_mut(p.index).ok_or(MergeError::BadIndex(p.index))?;
            *slot = Some((p.prediction, p.confidence));
        }

        let mut statuses = Vec::with_capacity(rows);
        let mut confidences = Vec::with_capacity(rows);
        for (idx, entry) in labels.into_iter().enumerate() {
            let (label, confidence) = entry.ok_or(MergeError::BadIndex(idx))?;
            statuses.push(Status::from_label(label).ok_or(MergeError::UnknownLabel(label))?);
            confidences.push(confidence);
        }

        let label_text = statuses
            .iter()
            .map(|s| match s {
                Status::Authentic => LABEL_AUTHENTIC.to_string(),
                Status::Counterfeit => LABEL_COUNTERFEIT.to_string(),
            })
            .collect();
        table.set_column(PREDICTION_COLUMN, label_text);
        table.set_column(STATUS_COLUMN, statuses.iter().map(|s| s.as_str().to_string()).collect());
        table.set_column(CONFIDENCE_COLUMN, confidences.iter().map(|c| format!("{:.4}", c)).collect());

        let summary = Summary::from_statuses(&statuses);
        Ok(Self { table, statuses, summary })
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    #[cfg(test)]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Rows matching `filter`
    pub fn filtered(&self, filter: StatusFilter) -> Table {
        self.table.filter_rows(|idx| filter.matches(self.statuses[idx]))
    }
}
