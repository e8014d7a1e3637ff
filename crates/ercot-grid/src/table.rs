//! Dense entity × time tables.

use ercot_types::{ErcotError, Granularity, Result, TimeSlot};

use crate::CanonicalTimeGrid;

/// One entity's values, one cell per grid slot. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    /// Creates a column.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a column of `len` missing values.
    #[must_use]
    pub fn missing(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![None; len])
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cells.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Returns the value at `row`, or `None` if missing.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied().flatten()
    }

    /// Returns the number of present values.
    #[must_use]
    pub fn present(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// A normalized report: one row per grid slot, one column per entity.
///
/// The row count always equals the grid length, whatever the input held.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    grid: CanonicalTimeGrid,
    columns: Vec<Column>,
}

impl NormalizedTable {
    /// Creates a table with no entity columns.
    #[must_use]
    pub const fn empty(grid: CanonicalTimeGrid) -> Self {
        Self {
            grid,
            columns: Vec::new(),
        }
    }

    /// Assembles a table from columns aligned to `grid`.
    ///
    /// # Errors
    ///
    /// Returns an error if a column length differs from the grid length or a
    /// column name repeats.
    pub fn from_parts(grid: CanonicalTimeGrid, columns: Vec<Column>) -> Result<Self> {
        let rows = grid.len();
        for (i, column) in columns.iter().enumerate() {
            if column.values.len() != rows {
                return Err(ErcotError::Format(format!(
                    "column '{}' has {} values, grid has {rows} rows",
                    column.name,
                    column.values.len()
                )));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(ErcotError::Format(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { grid, columns })
    }

    /// Returns the underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &CanonicalTimeGrid {
        &self.grid
    }

    /// Returns the grid granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.grid.granularity()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Returns the entity columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the entity column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Returns the column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the value of `name` at `slot`.
    #[must_use]
    pub fn value(&self, slot: &TimeSlot, name: &str) -> Option<f64> {
        let row = self.grid.index_of(slot)?;
        self.column(name)?.get(row)
    }

    /// Returns the index column names: `Date`, `HE` and, for 15-minute grids, `Interval`.
    #[must_use]
    pub const fn index_columns(&self) -> &'static [&'static str] {
        match self.grid.granularity() {
            Granularity::Hourly => &["Date", "HE"],
            Granularity::FifteenMinute => &["Date", "HE", "Interval"],
        }
    }

    /// Iterates rows as `(slot, values)` in grid order.
    pub fn rows(&self) -> impl Iterator<Item = (TimeSlot, Vec<Option<f64>>)> + '_ {
        self.grid.slots().enumerate().map(|(row, slot)| {
            let values = self.columns.iter().map(|c| c.values[row]).collect();
            (slot, values)
        })
    }

    /// Adds a column holding the row-wise mean of the other columns.
    ///
    /// Missing values are ignored; a row with no present values stays missing.
    /// A column already named `name` is replaced in place and left out of the
    /// mean.
    #[must_use]
    pub fn with_average_column(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let values = (0..self.row_count())
            .map(|row| {
                let (sum, count) = self
                    .columns
                    .iter()
                    .filter(|c| c.name != name)
                    .filter_map(|c| c.values[row])
                    .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
                (count > 0).then(|| sum / f64::from(count))
            })
            .collect();

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        self
    }
}
