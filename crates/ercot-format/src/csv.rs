//! CSV output format.

use chrono::NaiveDate;
use ercot_grid::{CanonicalTimeGrid, Column, NormalizedTable, RecordTable};
use ercot_types::{DATE_FORMAT, DateRange, Granularity, TimeSlot};
use std::io::{Read, Write};

use crate::{FormatError, Formatter};

/// CSV formatter.
///
/// Grid tables are written with a `Date,HE[,Interval],<entity>...` header.
/// Missing values are empty fields.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: u8,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            include_header: true,
        }
    }

    fn writer<W: Write>(&self, writer: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(writer)
    }

    /// Reads a grid table previously written by [`Formatter::write_table`].
    ///
    /// The date range is taken from the first and last rows, which must form
    /// a complete grid. A file without data rows reads back as an empty grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is not a grid header, a cell cannot be
    /// parsed, or rows are missing or out of order.
    pub fn read_table<R: Read>(&self, reader: R) -> Result<NormalizedTable, FormatError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();
        let granularity = match names.as_slice() {
            ["Date", "HE", "Interval", ..] => Granularity::FifteenMinute,
            ["Date", "HE", ..] => Granularity::Hourly,
            _ => {
                return Err(FormatError::Header(format!(
                    "expected Date,HE[,Interval], got {}",
                    names.join(",")
                )));
            }
        };
        let index_width = if granularity.has_interval() { 3 } else { 2 };
        let entities = &names[index_width..];

        let mut slots = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); entities.len()];

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |i: usize| record.get(i).unwrap_or_default().trim();
            let invalid = |i: usize| FormatError::InvalidCell {
                row,
                column: names[i].to_string(),
                value: cell(i).to_string(),
            };

            let date =
                NaiveDate::parse_from_str(cell(0), DATE_FORMAT).map_err(|_| invalid(0))?;
            let hour_ending = cell(1).parse::<u8>().map_err(|_| invalid(1))?;
            let minute = if granularity.has_interval() {
                cell(2).parse::<u8>().map_err(|_| invalid(2))?
            } else {
                0
            };
            slots.push(TimeSlot::new(date, hour_ending, minute));

            for (i, column) in values.iter_mut().enumerate() {
                let text = cell(index_width + i);
                let value = if text.is_empty() {
                    None
                } else {
                    Some(text.parse::<f64>().map_err(|_| invalid(index_width + i))?)
                };
                column.push(value);
            }
        }

        let range = match (slots.first(), slots.last()) {
            (Some(first), Some(last)) => DateRange::between(first.date, last.date),
            _ => DateRange::between(NaiveDate::MAX, NaiveDate::MIN),
        };
        let grid = CanonicalTimeGrid::new(range, granularity);
        if grid.len() != slots.len() {
            return Err(FormatError::Grid(format!(
                "{} rows for {} slots in {range}",
                slots.len(),
                grid.len()
            )));
        }
        if let Some((expected, found)) = grid.slots().zip(&slots).find(|(a, b)| a != *b) {
            return Err(FormatError::Grid(format!("expected {expected}, found {found}")));
        }

        let columns = entities
            .iter()
            .zip(values)
            .map(|(name, values)| Column::new(*name, values))
            .collect();
        NormalizedTable::from_parts(grid, columns).map_err(|e| FormatError::Grid(e.to_string()))
    }
}

impl Formatter for CsvFormatter {
    fn write_table<W: Write + Send>(
        &self,
        table: &NormalizedTable,
        writer: W,
    ) -> Result<(), FormatError> {
        let mut writer = self.writer(writer);
        let fifteen = table.granularity().has_interval();

        if self.include_header {
            let mut header: Vec<&str> = table.index_columns().to_vec();
            header.extend(table.column_names());
            writer.write_record(&header)?;
        }

        for (slot, values) in table.rows() {
            let mut record = vec![
                slot.date.format(DATE_FORMAT).to_string(),
                slot.hour_ending.to_string(),
            ];
            if fifteen {
                record.push(slot.minute.to_string());
            }
            record.extend(
                values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_records<W: Write + Send>(
        &self,
        table: &RecordTable,
        writer: W,
    ) -> Result<(), FormatError> {
        let mut writer = self.writer(writer);

        if self.include_header {
            writer.write_record(table.columns())?;
        }
        for row in table.rows() {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == b'\t' { "tsv" } else { "csv" }
    }
}
