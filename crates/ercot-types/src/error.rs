//! Error types for the ERCOT client.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for ERCOT client operations.
pub type Result<T> = std::result::Result<T, ErcotError>;

/// Errors that can occur while fetching and normalizing report data.
#[derive(Error, Debug)]
pub enum ErcotError {
    /// The identity provider rejected the credentials or API key.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A transient upstream failure outlasted the retry budget.
    #[error("Fetch from {endpoint} failed after retries (last status: {})", status_label(.status))]
    Fetch {
        /// The report endpoint being fetched.
        endpoint: String,
        /// Last HTTP status observed, if any response was received.
        status: Option<u16>,
    },

    /// A record did not match the declared report shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// HTTP transport failure outside the retry path.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The report query is missing a required parameter or is malformed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Report not found in the registry.
    #[error("Unknown report: {0}")]
    UnknownReport(String),

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output format error.
    #[error("Format error: {0}")]
    Format(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Error raised when raw records do not match the declared report shape.
///
/// These indicate an upstream contract change and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A record carried a different number of fields than the layout declares.
    #[error("Record {index} has {found} fields, expected {expected}")]
    FieldCount {
        /// Position of the record in the raw record set.
        index: usize,
        /// Field count declared by the report layout.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },

    /// A field could not be interpreted as the declared kind.
    #[error("Record {index} field {field}: {reason} (got {value})")]
    InvalidField {
        /// Position of the record in the raw record set.
        index: usize,
        /// Position of the field within the record.
        field: usize,
        /// The offending value, rendered as JSON.
        value: String,
        /// What was expected.
        reason: String,
    },
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },

    /// A date string was not in `YYYY-MM-DD` form.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_endpoint_and_status() {
        let err = ErcotError::Fetch {
            endpoint: "https://api.ercot.com/api/public-reports/np4-190-cd/dam_stlmnt_pnt_prices"
                .to_string(),
            status: Some(503),
        };
        let msg = err.to_string();
        assert!(msg.contains("np4-190-cd"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_fetch_error_without_status() {
        let err = ErcotError::Fetch {
            endpoint: "x".to_string(),
            status: None,
        };
        assert!(err.to_string().contains("none"));
    }
}
