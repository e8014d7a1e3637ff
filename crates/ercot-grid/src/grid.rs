//! The canonical date × intraday-slot grid.

use ercot_types::{DateRange, Granularity, TimeSlot};

/// Every slot of every day in a date range, in chronological order.
///
/// The grid is fully determined by its range and granularity. An inverted
/// range yields an empty grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalTimeGrid {
    range: DateRange,
    granularity: Granularity,
}

impl CanonicalTimeGrid {
    /// Creates the grid for `range` at `granularity`.
    #[must_use]
    pub const fn new(range: DateRange, granularity: Granularity) -> Self {
        Self { range, granularity }
    }

    /// Returns the date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Returns the granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Returns the number of slots: days × slots per day.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.total_days() * self.granularity.slots_per_day()
    }

    /// Returns true if the grid has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all slots in chronological order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        let per_day = self.granularity.slots_per_day();
        self.range.days().flat_map(move |date| {
            (0..per_day).filter_map(move |index| self.granularity.intraday(date, index))
        })
    }

    /// Returns the row position of `slot`, or `None` if it lies outside the grid.
    #[must_use]
    pub fn index_of(&self, slot: &TimeSlot) -> Option<usize> {
        let day = self.range.day_index(slot.date)?;
        let intraday = self.granularity.intraday_index(slot)?;
        Some(day * self.granularity.slots_per_day() + intraday)
    }

    /// Returns the slot at row `index`.
    #[must_use]
    pub fn slot_at(&self, index: usize) -> Option<TimeSlot> {
        if index >= self.len() {
            return None;
        }
        let per_day = self.granularity.slots_per_day();
        let date = self.range.days().nth(index / per_day)?;
        self.granularity.intraday(date, index % per_day)
    }
}
