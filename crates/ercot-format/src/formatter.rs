//! Output format abstraction.

use ercot_grid::{NormalizedTable, RecordTable};
use ercot_types::ErcotError;
use std::io::Write;
use thiserror::Error;

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Tab-separated values.
    Tsv,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Tsv]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur while writing or reading tables.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A header did not match the expected table layout.
    #[error("Invalid header: {0}")]
    Header(String),

    /// A cell could not be parsed.
    #[error("Row {row}, column '{column}': invalid value '{value}'")]
    InvalidCell {
        /// Zero-based data row.
        row: usize,
        /// Column name.
        column: String,
        /// Offending text.
        value: String,
    },

    /// The rows do not form a complete time grid.
    #[error("Rows do not form a complete grid: {0}")]
    Grid(String),
}

impl From<FormatError> for ErcotError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => Self::Io(e),
            other => Self::Format(other.to_string()),
        }
    }
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes a normalized grid table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write + Send>(
        &self,
        table: &NormalizedTable,
        writer: W,
    ) -> Result<(), FormatError>;

    /// Writes a flat or raw record table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_records<W: Write + Send>(
        &self,
        table: &RecordTable,
        writer: W,
    ) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}
