//! Report response body parsing.
//!
//! Bodies look like `{"data": [[...], ...], "_meta": {"totalPages": N}}`.

use ercot_types::{RawRecord, Result, SchemaError};
use serde_json::Value;

/// Reads `_meta.totalPages` from a response body.
///
/// Returns `None` when the metadata is missing or not a non-negative integer.
#[must_use]
pub fn total_pages(body: &Value) -> Option<u32> {
    body.get("_meta")?
        .get("totalPages")?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
}

/// Extracts the `data` array of a response body as raw records.
///
/// Returns `Ok(None)` when the body has no `data` array, which callers treat
/// as a transient failure.
///
/// # Errors
///
/// Returns a schema error if an element of `data` is not itself an array.
pub fn page_records(body: Value) -> Result<Option<Vec<RawRecord>>> {
    let Value::Object(mut map) = body else {
        return Ok(None);
    };
    let Some(Value::Array(rows)) = map.remove("data") else {
        return Ok(None);
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Array(fields) => Ok(RawRecord::new(fields)),
            other => Err(SchemaError::InvalidField {
                index,
                field: 0,
                value: other.to_string(),
                reason: "expected an array of fields".to_string(),
            }
            .into()),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ercot_types::ErcotError;
    use serde_json::json;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(&json!({"_meta": {"totalPages": 3}})), Some(3));
        assert_eq!(total_pages(&json!({"_meta": {}})), None);
        assert_eq!(total_pages(&json!({"data": []})), None);
        assert_eq!(total_pages(&json!({"_meta": {"totalPages": "3"}})), None);
    }

    #[test]
    fn test_page_records() {
        let body = json!({"data": [["2024-01-01", "01:00", "HB_WEST", 21.5, false]]});
        let records = page_records(body).unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 5);
        assert_eq!(records[0].get(2), Some(&json!("HB_WEST")));
    }

    #[test]
    fn test_missing_data_is_none() {
        assert!(page_records(json!({"_meta": {"totalPages": 1}})).unwrap().is_none());
        assert!(page_records(json!("gateway timeout")).unwrap().is_none());
    }

    #[test]
    fn test_non_array_row_is_schema_error() {
        let result = page_records(json!({"data": [["a"], {"b": 1}]}));
        assert!(matches!(
            result,
            Err(ErcotError::Schema(SchemaError::InvalidField { index: 1, .. }))
        ));
    }
}
