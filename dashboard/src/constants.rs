//! Central Configuration Constants
//!
//! Single source of truth for dashboard defaults.

/// Default serving API base URL
///
/// Overridden by `--api-url` or `BANKNOTE_API_URL`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default HTTP timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Rows shown in the preview
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Columns the serving API requires
pub const EXPECTED_COLUMNS: [&str; 6] = [
    "diagonal",
    "height_left",
    "height_right",
    "margin_low",
    "margin_up",
    "length",
];

/// Label contract published by the API's `/model_info`
pub const LABEL_COUNTERFEIT: i64 = 0;
pub const LABEL_AUTHENTIC: i64 = 1;

/// Columns the dashboard adds when merging predictions
pub const PREDICTION_COLUMN: &str = "prediction";
pub const STATUS_COLUMN: &str = "status";
pub const CONFIDENCE_COLUMN: &str = "confidence";

/// Width of the bar chart, in characters
pub const CHART_WIDTH: usize = 40;
