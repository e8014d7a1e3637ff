//! Delivery date ranges and day iteration.

use chrono::{Days, NaiveDate};

use crate::DateRangeError;

/// Date format used by report query parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of delivery dates.
///
/// A range whose start is after its end is empty: it yields no days and
/// produces a grid with zero rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range without validation; `start > end` gives an empty range.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Creates a date range for a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Parses `YYYY-MM-DD` bounds into a validated range.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is malformed or start > end.
    pub fn parse(start: &str, end: &str) -> Result<Self, DateRangeError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Returns true if the range contains no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Returns an iterator over all days in the range.
    #[must_use]
    pub const fn days(&self) -> DayIterator {
        DayIterator {
            current: Some(self.start),
            end: self.end,
        }
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns the zero-based position of `date` within the range.
    #[must_use]
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as usize)
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over all days in a date range.
#[derive(Debug, Clone)]
pub struct DayIterator {
    current: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayIterator {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.filter(|d| *d <= self.end)?;
        self.current = current.checked_add_days(Days::new(1));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.current {
            Some(current) if current <= self.end => {
                (self.end - current).num_days() as usize + 1
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayIterator {}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error if the string is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DateRangeError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_new() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.total_days(), 31);
    }

    #[test]
    fn test_date_range_invalid() {
        assert!(DateRange::new(date(2024, 1, 31), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_between_inverted_is_empty() {
        let range = DateRange::between(date(2024, 1, 2), date(2024, 1, 1));
        assert!(range.is_empty());
        assert_eq!(range.total_days(), 0);
        assert_eq!(range.days().count(), 0);
    }

    #[test]
    fn test_day_iterator_crosses_month() {
        let range = DateRange::new(date(2024, 1, 30), date(2024, 2, 2)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(range.days().len(), 4);
        assert_eq!(days[2], date(2024, 2, 1));
    }

    #[test]
    fn test_leap_day_counted() {
        let range = DateRange::new(date(2024, 2, 28), date(2024, 3, 1)).unwrap();
        assert_eq!(range.total_days(), 3);
    }

    #[test]
    fn test_day_index() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        assert_eq!(range.day_index(date(2024, 1, 3)), Some(2));
        assert_eq!(range.day_index(date(2024, 1, 4)), None);
    }

    #[test]
    fn test_parse() {
        let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();
        assert_eq!(range.total_days(), 2);
        assert!(matches!(
            DateRange::parse("01/01/2024", "2024-01-02"),
            Err(DateRangeError::InvalidDate(_))
        ));
    }
}
