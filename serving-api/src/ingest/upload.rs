//! CSV upload parsing
//!
//! Uploads come from spreadsheets exported with different locales, so the
//! encoding and the separator are sniffed: every (encoding, separator)
//! candidate is tried in order and the first one producing a non-empty table
//! with all expected columns wins.

use std::borrow::Cow;

use crate::models::{missing_columns, Cell, FeatureMatrix, RawRow, ValidationError, EXPECTED_COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    fn label(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        }
    }

    /// Latin-1 maps each byte to the code point of the same value, so it
    /// never fails.
    fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Encoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            Encoding::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
        }
    }
}

/// Candidates in priority order
pub const CANDIDATES: [(Encoding, u8); 4] = [
    (Encoding::Utf8, b','),
    (Encoding::Utf8, b';'),
    (Encoding::Latin1, b','),
    (Encoding::Latin1, b';'),
];

/// Result of reading the upload with one candidate
#[derive(Debug)]
enum Attempt {
    Parsed(Vec<RawRow>),
    MissingColumns(Vec<String>),
    NoRows,
    Failed(String),
}

fn try_candidate(bytes: &[u8], encoding: Encoding, separator: u8) -> Attempt {
    let Some(text) = encoding.decode(bytes) else {
        return Attempt::Failed("not valid text in this encoding".to_string());
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => return Attempt::Failed(e.to_string()),
    };

    let missing = missing_columns(headers.iter());
    if !missing.is_empty() {
        return Attempt::MissingColumns(missing);
    }

    let positions: Vec<usize> = EXPECTED_COLUMNS
        .iter()
        .filter_map(|col| headers.iter().position(|h| h == *col))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => return Attempt::Failed(e.to_string()),
        };
        let row: RawRow = std::array::from_fn(|i| Cell::parse(record.get(positions[i]).unwrap_or("")));
        rows.push(row);
    }

    if rows.is_empty() {
        Attempt::NoRows
    } else {
        Attempt::Parsed(rows)
    }
}

/// Decode an uploaded CSV into raw feature rows.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::Empty("Uploaded file is empty".to_string()));
    }

    let mut best_missing: Option<Vec<String>> = None;
    let mut header_only = false;
    let mut failures = Vec::new();

    for (encoding, separator) in CANDIDATES {
        match try_candidate(bytes, encoding, separator) {
            Attempt::Parsed(rows) => {
                tracing::debug!(
                    encoding = encoding.label(),
                    separator = %(separator as char),
                    rows = rows.len(),
                    "CSV decoded"
                );
                return Ok(rows);
            }
            Attempt::NoRows => header_only = true,
            Attempt::MissingColumns(missing) => {
                if missing.len() < EXPECTED_COLUMNS.len()
                    && best_missing.as_ref().map_or(true, |best| missing.len() < best.len())
                {
                    best_missing = Some(missing.clone());
                }
                failures.push(format!(
                    "{} '{}': missing columns {}",
                    encoding.label(),
                    separator as char,
                    missing.join(", ")
                ));
            }
            Attempt::Failed(reason) => {
                failures.push(format!("{} '{}': {}", encoding.label(), separator as char, reason));
            }
        }
    }

    if header_only {
        return Err(ValidationError::Empty("CSV contains a header but no data rows".to_string()));
    }
    if let Some(missing) = best_missing {
        return Err(ValidationError::MissingColumns(missing));
    }
    Err(ValidationError::Unreadable(format!(
        "Could not read the file as CSV with columns {}; tried {}",
        EXPECTED_COLUMNS.join(", "),
        failures.join("; ")
    )))
}

/// Decode and validate an uploaded CSV.
pub fn parse_features(bytes: &[u8]) -> Result<FeatureMatrix, ValidationError> {
    FeatureMatrix::from_rows(parse_rows(bytes)?)
}
