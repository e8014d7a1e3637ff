//! Sparse record sets to dense, gap-filled tables.

use std::collections::HashMap;

use ercot_types::{
    DateRange, GridLayout, Granularity, RawRecord, RawRecordSet, Result, SchemaError, TimeSlot,
};
use tracing::debug;

use crate::field::{self, parse_field};
use crate::{CanonicalTimeGrid, Column, NormalizedTable};

/// Reshapes entity × time records onto the canonical grid.
///
/// Entities become columns in the order they are first seen. Every column
/// has exactly one cell per grid slot; slots without a record stay missing.
/// When a slot occurs more than once for an entity, the first record wins.
///
/// # Example
///
/// ```
/// use ercot_grid::GridNormalizer;
/// use ercot_types::{DateRange, GridLayout, RawRecordSet, RawRecord};
/// use serde_json::json;
///
/// let layout = GridLayout {
///     width: 5, entity: 2, date: 0, hour: 1, interval: None, value: 3,
///     filter: None, average: None,
/// };
/// let records: RawRecordSet = [RawRecord::new(vec![
///     json!("2024-01-01"), json!("01:00"), json!("HB_WEST"), json!(21.5), json!(false),
/// ])]
/// .into_iter()
/// .collect();
///
/// let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
/// let table = GridNormalizer::new(layout).normalize(&records, range).unwrap();
/// assert_eq!(table.row_count(), 24);
/// assert_eq!(table.column("HB_WEST").unwrap().present(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GridNormalizer {
    layout: GridLayout,
    requested: Vec<String>,
}

impl GridNormalizer {
    /// Creates a normalizer for the given layout.
    #[must_use]
    pub const fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            requested: Vec::new(),
        }
    }

    /// Declares entities that must appear as columns even without records.
    #[must_use]
    pub fn with_requested<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the layout.
    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Returns the grid granularity implied by the layout.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.layout.granularity()
    }

    /// Normalizes `records` onto the grid spanned by `range`.
    ///
    /// An inverted range produces a table with zero rows.
    ///
    /// # Errors
    ///
    /// Returns a schema error if any record has the wrong field count or an
    /// unparseable date, hour-ending, interval or value.
    pub fn normalize(&self, records: &RawRecordSet, range: DateRange) -> Result<NormalizedTable> {
        let grid = CanonicalTimeGrid::new(range, self.granularity());
        let rows = grid.len();

        let mut columns: Vec<ColumnBuilder> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut dropped = 0usize;
        let mut duplicates = 0usize;

        for (index, record) in records.iter().enumerate() {
            if record.len() != self.layout.width {
                return Err(SchemaError::FieldCount {
                    index,
                    expected: self.layout.width,
                    found: record.len(),
                }
                .into());
            }
            if !self.passes_filter(record) {
                continue;
            }

            let entity = parse_field(record, index, self.layout.entity, field::entity)?;
            let slot = self.slot(record, index)?;
            let value = parse_field(record, index, self.layout.value, field::number)?;

            let position = *positions.entry(entity).or_insert_with_key(|name| {
                columns.push(ColumnBuilder::new(name.clone(), rows));
                columns.len() - 1
            });

            let Some(row) = grid.index_of(&slot) else {
                dropped += 1;
                continue;
            };
            if !columns[position].set(row, value) {
                duplicates += 1;
            }
        }

        if dropped > 0 {
            debug!(dropped, %range, "Dropped records outside the grid");
        }
        if duplicates > 0 {
            debug!(duplicates, "Ignored duplicate slots");
        }

        for name in &self.requested {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(ColumnBuilder::new(name.clone(), rows));
            }
        }

        let columns = columns.into_iter().map(ColumnBuilder::finish).collect();
        let table = NormalizedTable::from_parts(grid, columns)?;
        Ok(match &self.layout.average {
            Some(name) => table.with_average_column(name.clone()),
            None => table,
        })
    }

    fn passes_filter(&self, record: &RawRecord) -> bool {
        self.layout.filter.as_ref().is_none_or(|filter| {
            record
                .get(filter.field)
                .and_then(|v| v.as_str())
                .is_some_and(|v| v == filter.equals)
        })
    }

    fn slot(&self, record: &RawRecord, index: usize) -> Result<TimeSlot> {
        let date = parse_field(record, index, self.layout.date, field::date)?;
        let hour_ending = parse_field(record, index, self.layout.hour, field::hour_ending)?;
        let minute = match self.layout.interval {
            Some(interval) => parse_field(record, index, interval, field::interval_minute)?,
            None => 0,
        };
        Ok(TimeSlot::new(date, hour_ending, minute))
    }
}

#[derive(Debug)]
struct ColumnBuilder {
    name: String,
    values: Vec<Option<f64>>,
    filled: Vec<bool>,
}

impl ColumnBuilder {
    fn new(name: String, rows: usize) -> Self {
        Self {
            name,
            values: vec![None; rows],
            filled: vec![false; rows],
        }
    }

    /// Stores `value` at `row` unless the row was already filled.
    fn set(&mut self, row: usize, value: Option<f64>) -> bool {
        if self.filled[row] {
            return false;
        }
        self.filled[row] = true;
        self.values[row] = value;
        true
    }

    fn finish(self) -> Column {
        Column::new(self.name, self.values)
    }
}
