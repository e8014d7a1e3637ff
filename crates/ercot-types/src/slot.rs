//! Intraday slot granularity and time slot keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Minute offsets of the four settlement intervals within an hour.
pub const INTERVAL_MINUTES: [u8; 4] = [0, 15, 30, 45];

/// Sub-daily resolution of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One slot per hour-ending, 24 per day.
    #[default]
    Hourly,
    /// Four 15-minute intervals per hour-ending, 96 per day.
    FifteenMinute,
}

impl Granularity {
    /// Returns the number of intraday slots per calendar day.
    #[must_use]
    pub const fn slots_per_day(&self) -> usize {
        match self {
            Self::Hourly => 24,
            Self::FifteenMinute => 96,
        }
    }

    /// Returns the number of intervals per hour.
    #[must_use]
    pub const fn intervals_per_hour(&self) -> usize {
        match self {
            Self::Hourly => 1,
            Self::FifteenMinute => 4,
        }
    }

    /// Returns true if slots carry an interval offset.
    #[must_use]
    pub const fn has_interval(&self) -> bool {
        matches!(self, Self::FifteenMinute)
    }

    /// Returns the granularity as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::FifteenMinute => "15min",
        }
    }

    /// Returns the slot at `index` within a day, or `None` past the last slot.
    #[must_use]
    pub fn intraday(&self, date: NaiveDate, index: usize) -> Option<TimeSlot> {
        if index >= self.slots_per_day() {
            return None;
        }
        let per_hour = self.intervals_per_hour();
        let hour_ending = (index / per_hour) as u8;
        let minute = match self {
            Self::Hourly => 0,
            Self::FifteenMinute => INTERVAL_MINUTES[index % per_hour],
        };
        Some(TimeSlot::new(date, hour_ending, minute))
    }

    /// Returns the position of `slot` within its day, or `None` if the slot
    /// does not belong to this granularity.
    #[must_use]
    pub fn intraday_index(&self, slot: &TimeSlot) -> Option<usize> {
        if slot.hour_ending > 23 {
            return None;
        }
        let hour = usize::from(slot.hour_ending);
        match self {
            Self::Hourly => (slot.minute == 0).then_some(hour),
            Self::FifteenMinute => INTERVAL_MINUTES
                .iter()
                .position(|m| *m == slot.minute)
                .map(|interval| hour * 4 + interval),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hourly" | "h1" | "1h" | "hour" => Ok(Self::Hourly),
            "15min" | "m15" | "15m" | "fifteen_minute" | "interval" => Ok(Self::FifteenMinute),
            _ => Err(GranularityParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid granularity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranularityParseError(String);

impl std::fmt::Display for GranularityParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid granularity '{}', expected one of: hourly, 15min",
            self.0
        )
    }
}

impl std::error::Error for GranularityParseError {}

/// A canonical time key: delivery date, zero-based hour-ending and minute offset.
///
/// Ordering is chronological: by date, then hour-ending, then minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Delivery date.
    pub date: NaiveDate,
    /// Hour-ending, remapped from the API's 1–24 to 0–23.
    pub hour_ending: u8,
    /// Minute offset within the hour (always 0 for hourly reports).
    pub minute: u8,
}

impl TimeSlot {
    /// Creates a new time slot.
    #[must_use]
    pub const fn new(date: NaiveDate, hour_ending: u8, minute: u8) -> Self {
        Self {
            date,
            hour_ending,
            minute,
        }
    }

    /// Creates an hourly time slot.
    #[must_use]
    pub const fn hourly(date: NaiveDate, hour_ending: u8) -> Self {
        Self::new(date, hour_ending, 0)
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} HE{:02}:{:02}", self.date, self.hour_ending, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_slots_per_day() {
        assert_eq!(Granularity::Hourly.slots_per_day(), 24);
        assert_eq!(Granularity::FifteenMinute.slots_per_day(), 96);
    }

    #[test]
    fn test_intraday_round_trip() {
        for granularity in [Granularity::Hourly, Granularity::FifteenMinute] {
            for index in 0..granularity.slots_per_day() {
                let slot = granularity.intraday(day(), index).unwrap();
                assert_eq!(granularity.intraday_index(&slot), Some(index));
            }
            assert!(granularity.intraday(day(), granularity.slots_per_day()).is_none());
        }
    }

    #[test]
    fn test_fifteen_minute_layout() {
        let slot = Granularity::FifteenMinute.intraday(day(), 7).unwrap();
        assert_eq!(slot.hour_ending, 1);
        assert_eq!(slot.minute, 45);
    }

    #[test]
    fn test_hourly_rejects_minute_offset() {
        let slot = TimeSlot::new(day(), 3, 15);
        assert_eq!(Granularity::Hourly.intraday_index(&slot), None);
        assert_eq!(Granularity::FifteenMinute.intraday_index(&slot), Some(13));
    }

    #[test]
    fn test_slot_ordering() {
        let a = TimeSlot::new(day(), 0, 45);
        let b = TimeSlot::new(day(), 1, 0);
        assert!(a < b);
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("hourly".parse::<Granularity>().unwrap(), Granularity::Hourly);
        assert_eq!("15MIN".parse::<Granularity>().unwrap(), Granularity::FifteenMinute);
        assert!("daily".parse::<Granularity>().is_err());
    }
}
