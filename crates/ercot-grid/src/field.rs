//! Interpretation of positional JSON fields.
//!
//! Parsers return a short reason on failure; callers attach the record and
//! field position to build a [`SchemaError`].

use chrono::{NaiveDate, NaiveDateTime};
use ercot_types::{INTERVAL_MINUTES, RawRecord, SchemaError};
use serde_json::Value;

type FieldResult<T> = Result<T, &'static str>;

/// Returns field `field` of `record`, or a schema error if it is absent.
pub(crate) fn field_at(
    record: &RawRecord,
    index: usize,
    field: usize,
) -> Result<&Value, SchemaError> {
    record.get(field).ok_or(SchemaError::FieldCount {
        index,
        expected: field + 1,
        found: record.len(),
    })
}

/// Applies `parse` to a field, converting a failure into a schema error.
pub(crate) fn parse_field<T>(
    record: &RawRecord,
    index: usize,
    field: usize,
    parse: impl FnOnce(&Value) -> FieldResult<T>,
) -> Result<T, SchemaError> {
    let value = field_at(record, index, field)?;
    parse(value).map_err(|reason| SchemaError::InvalidField {
        index,
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    })
}

/// Parses a delivery date (`YYYY-MM-DD` or `MM/DD/YYYY`).
pub(crate) fn date(value: &Value) -> FieldResult<NaiveDate> {
    let text = value.as_str().ok_or("expected a date string")?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .map_err(|_| "expected a YYYY-MM-DD date")
}

/// Parses an hour-ending (`"01:00"`..`"24:00"` or 1..24) into 0..23.
pub(crate) fn hour_ending(value: &Value) -> FieldResult<u8> {
    let hour = match value {
        Value::Number(n) => n.as_u64().ok_or("expected hour-ending 1-24")?,
        Value::String(s) => {
            let hours = s.trim().split(':').next().unwrap_or_default();
            hours.parse::<u64>().map_err(|_| "expected hour-ending 1-24")?
        }
        _ => return Err("expected hour-ending 1-24"),
    };
    match hour {
        1..=24 => Ok((hour - 1) as u8),
        _ => Err("hour-ending outside 1-24"),
    }
}

/// Parses a settlement interval (1..4) into its minute offset.
pub(crate) fn interval_minute(value: &Value) -> FieldResult<u8> {
    let interval = match value {
        Value::Number(n) => n.as_u64().ok_or("expected interval 1-4")?,
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| "expected interval 1-4")?,
        _ => return Err("expected interval 1-4"),
    };
    match interval {
        1..=4 => Ok(INTERVAL_MINUTES[(interval - 1) as usize]),
        _ => Err("interval outside 1-4"),
    }
}

/// Parses a numeric value. `null`, empty strings and non-finite text
/// (`NaN`, `inf`) are missing.
pub(crate) fn number(value: &Value) -> FieldResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or("expected a number"),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|v| v.is_finite().then_some(v))
            .map_err(|_| "expected a number"),
        _ => Err("expected a number"),
    }
}

/// Parses a whole number. `null` and empty strings are missing.
pub(crate) fn integer(value: &Value) -> FieldResult<Option<i64>> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| Some(f as i64))
                .ok_or("expected a whole number")
        }
        _ => match number(value)? {
            Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(_) => Err("expected a whole number"),
            None => Ok(None),
        },
    }
}

/// Parses a SCED timestamp such as `2024-01-01T00:05:16`.
pub(crate) fn sced_timestamp(value: &Value) -> FieldResult<NaiveDateTime> {
    let text = value.as_str().ok_or("expected a timestamp string")?.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| "expected a YYYY-MM-DDTHH:MM:SS timestamp")
}

/// Renders an entity key field as a column name.
pub(crate) fn entity(value: &Value) -> FieldResult<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("expected an entity name"),
    }
}
