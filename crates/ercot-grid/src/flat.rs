//! Row tables for reports that are not entity × time matrices.

use chrono::{NaiveDate, Timelike};
use ercot_types::{FieldKind, FlatLayout, RawRecordSet, Result, SchemaError};
use serde_json::Value;

use crate::field::{self, parse_field};

/// A typed table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Calendar date.
    Date(NaiveDate),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// Free text.
    Text(String),
    /// Missing value.
    Missing,
}

impl Cell {
    /// Returns the cell as a float, if numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true for [`Cell::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number))
                .unwrap_or(Self::Missing),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format(ercot_types::DATE_FORMAT)),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

/// Named columns of typed cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordTable {
    /// Creates a table. Every row must have one cell per column.
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the position of column `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the cells of column `name`.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }
}

/// Reshapes records through a flat layout.
///
/// Rows are sorted by `Date`, `HE` and `Interval` when those columns exist.
/// The sort is stable, so rows sharing a time keep their received order.
///
/// # Errors
///
/// Returns a schema error if a record has the wrong field count or a field
/// does not match its declared kind.
pub fn reshape_flat(layout: &FlatLayout, records: &RawRecordSet) -> Result<RecordTable> {
    let columns: Vec<String> = layout
        .columns
        .iter()
        .flat_map(|column| match column.kind {
            FieldKind::ScedTimestamp => ["Date", "HE", "Interval"].map(String::from).to_vec(),
            _ => vec![column.name.clone()],
        })
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if record.len() != layout.width {
            return Err(SchemaError::FieldCount {
                index,
                expected: layout.width,
                found: record.len(),
            }
            .into());
        }

        let mut row = Vec::with_capacity(columns.len());
        for column in &layout.columns {
            let f = column.field;
            match column.kind {
                FieldKind::Date => {
                    row.push(Cell::Date(parse_field(record, index, f, field::date)?));
                }
                FieldKind::HourEnding => {
                    let he = parse_field(record, index, f, field::hour_ending)?;
                    row.push(Cell::Integer(i64::from(he)));
                }
                FieldKind::Interval => {
                    let minute = parse_field(record, index, f, field::interval_minute)?;
                    row.push(Cell::Integer(i64::from(minute)));
                }
                FieldKind::Number => {
                    row.push(parse_field(record, index, f, field::number)?.into());
                }
                FieldKind::Integer => {
                    let value = parse_field(record, index, f, field::integer)?;
                    row.push(value.map_or(Cell::Missing, Cell::Integer));
                }
                FieldKind::Text => {
                    row.push(match field::field_at(record, index, f)? {
                        Value::Null => Cell::Missing,
                        Value::String(s) => Cell::Text(s.clone()),
                        other => Cell::Text(other.to_string()),
                    });
                }
                FieldKind::ScedTimestamp => {
                    let ts = parse_field(record, index, f, field::sced_timestamp)?;
                    row.push(Cell::Date(ts.date()));
                    row.push(Cell::Integer(i64::from(ts.hour())));
                    row.push(Cell::Integer(i64::from(ts.minute())));
                }
            }
        }
        rows.push(row);
    }

    let table = RecordTable::new(columns, rows);
    Ok(sort_by_time(table))
}

/// Passes records through unchanged, naming columns by field position.
#[must_use]
pub fn reshape_raw(records: &RawRecordSet) -> RecordTable {
    let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
    let columns = (0..width).map(|i| i.to_string()).collect();
    let rows = records
        .iter()
        .map(|record| {
            (0..width)
                .map(|i| record.get(i).map_or(Cell::Missing, Cell::from_json))
                .collect()
        })
        .collect();
    RecordTable::new(columns, rows)
}

fn sort_by_time(mut table: RecordTable) -> RecordTable {
    let Some(date) = table.column_index("Date") else {
        return table;
    };
    let he = table.column_index("HE");
    let interval = table.column_index("Interval");
    let integer = |row: &[Cell], column: Option<usize>| match column.map(|i| &row[i]) {
        Some(Cell::Integer(v)) => Some(*v),
        _ => None,
    };

    table.rows.sort_by_cached_key(|row| {
        let day = match &row[date] {
            Cell::Date(d) => Some(*d),
            _ => None,
        };
        (day, integer(row, he), integer(row, interval))
    });
    table
}
