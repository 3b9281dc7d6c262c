//! JSON record parsing

use serde_json::{Map, Value};

use crate::models::{missing_columns, Cell, FeatureMatrix, RawRow, ValidationError, EXPECTED_COLUMNS};

pub type Record = Map<String, Value>;

/// Validate a list of JSON objects.
///
/// A column counts as present when at least one record carries the key;
/// records lacking a key that others carry are reported as missing values.
pub fn parse_features(records: &[Record]) -> Result<FeatureMatrix, ValidationError> {
    if records.is_empty() {
        return Err(ValidationError::Empty("Request body contains no records".to_string()));
    }

    let missing = missing_columns(
        EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|col| records.iter().any(|r| r.contains_key(*col))),
    );
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let rows: Vec<RawRow> = records
        .iter()
        .map(|record| EXPECTED_COLUMNS.map(|col| Cell::from_json(record.get(col))))
        .collect();

    FeatureMatrix::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_records() {
        let input = records(json!([
            {"diagonal": 171.8, "height_left": 104.2, "height_right": 104.3,
             "margin_low": 4.3, "margin_up": 2.3, "length": 113.2, "note": "ignored"},
            {"length": "112.5", "margin_up": 3, "margin_low": 5.1,
             "height_right": 104, "height_left": 104, "diagonal": 172}
        ]));

        let matrix = parse_features(&input).unwrap();
        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.values()[[1, 5]], 112.5);
        assert_eq!(matrix.values()[[1, 0]], 172.0);
    }

    #[test]
    fn test_missing_columns_named_exactly() {
        let input = records(json!([
            {"diagonal": 171.8, "height_left": 104.2, "height_right": 104.3, "margin_low": 4.3}
        ]));

        assert_eq!(
            parse_features(&input).unwrap_err(),
            ValidationError::MissingColumns(vec!["margin_up".to_string(), "length".to_string()])
        );
    }

    #[test]
    fn test_null_or_absent_is_missing_value() {
        let input = records(json!([
            {"diagonal": 171.8, "height_left": 104.2, "height_right": 104.3,
             "margin_low": null, "margin_up": 2.3, "length": 113.2},
            {"diagonal": 171.8, "height_left": 104.2, "height_right": 104.3,
             "margin_low": 4.0, "margin_up": 2.3}
        ]));

        match parse_features(&input).unwrap_err() {
            ValidationError::MissingValues(map) => {
                assert_eq!(map.get("margin_low"), Some(&1));
                assert_eq!(map.get("length"), Some(&1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_list() {
        assert!(matches!(parse_features(&[]), Err(ValidationError::Empty(_))));
    }

    #[test]
    fn test_non_numeric_value() {
        let input = records(json!([
            {"diagonal": "wide", "height_left": 104.2, "height_right": 104.3,
             "margin_low": 4.3, "margin_up": 2.3, "length": 113.2}
        ]));

        assert!(matches!(
            parse_features(&input),
            Err(ValidationError::InvalidValue { ref column, row: 0, .. }) if column == "diagonal"
        ));
    }
}
