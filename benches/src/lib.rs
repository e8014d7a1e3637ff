//! Synthetic report data for ercot benchmarks.

use chrono::NaiveDate;
use ercot_lib::{DateRange, GridLayout, RawRecord, RawRecordSet};
use serde_json::{Value, json};

/// Shape of a generated record set.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    /// First delivery date.
    pub start: NaiveDate,
    /// Number of delivery days.
    pub days: u32,
    /// Number of distinct entities.
    pub entities: usize,
    /// Every n-th slot is left out to exercise gap filling (0 disables gaps).
    pub gap_every: usize,
}

impl SyntheticConfig {
    /// Returns the delivery range covered by the generated records.
    pub fn range(&self) -> DateRange {
        let end = self.start + chrono::Days::new(u64::from(self.days.saturating_sub(1)));
        DateRange::between(self.start, end)
    }
}

/// Generates records in the field order of `layout`, one per entity per slot.
///
/// Records arrive day by day with entities interleaved, the way report pages
/// are usually ordered. Fields the layout does not read are null, except the
/// filter field, which always matches.
pub fn grid_records(layout: &GridLayout, config: &SyntheticConfig) -> RawRecordSet {
    let intervals: &[u8] = if layout.interval.is_some() { &[1, 2, 3, 4] } else { &[1] };
    let mut records = Vec::new();
    let mut slot = 0usize;

    for date in config.range().days() {
        let day = date.format("%Y-%m-%d").to_string();
        for hour in 1..=24u8 {
            for &interval in intervals {
                slot += 1;
                if config.gap_every > 0 && slot % config.gap_every == 0 {
                    continue;
                }
                for entity in 0..config.entities {
                    let mut fields = vec![Value::Null; layout.width];
                    fields[layout.date] = json!(day);
                    fields[layout.hour] = json!(hour);
                    if let Some(i) = layout.interval {
                        fields[i] = json!(interval);
                    }
                    fields[layout.entity] = json!(format!("ENTITY_{entity:03}"));
                    fields[layout.value] = json!(20.0 + (slot % 97) as f64 * 0.25 + entity as f64);
                    if let Some(filter) = &layout.filter {
                        fields[filter.field] = json!(filter.equals);
                    }
                    records.push(RawRecord::new(fields));
                }
            }
        }
    }

    records.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ercot_lib::{ReportLayout, ReportRegistry};

    fn layout(id: &str) -> GridLayout {
        match ReportRegistry::global().get(id).unwrap().layout() {
            ReportLayout::Grid(grid) => grid.clone(),
            _ => panic!("{id} is not a grid report"),
        }
    }

    #[test]
    fn test_record_count() {
        let config = SyntheticConfig {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            days: 2,
            entities: 3,
            gap_every: 0,
        };
        assert_eq!(grid_records(&layout("dam-spp"), &config).len(), 2 * 24 * 3);
        assert_eq!(grid_records(&layout("rtm-spp-hub"), &config).len(), 2 * 96 * 3);
    }

    #[test]
    fn test_gaps() {
        let config = SyntheticConfig {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            days: 1,
            entities: 1,
            gap_every: 2,
        };
        assert_eq!(grid_records(&layout("dam-spp"), &config).len(), 12);
    }
}
