//! Core types for the ERCOT public reports client.
//!
//! This crate provides the fundamental data structures shared by the workspace:
//!
//! - [`DateRange`] - Inclusive delivery date range
//! - [`Granularity`] and [`TimeSlot`] - Intraday slot layout and time keys
//! - [`RawRecord`] and [`RawRecordSet`] - Positional report rows as fetched
//! - [`ReportDefinition`] - Endpoint metadata and record layout
//! - [`ErcotError`] - Error taxonomy shared by fetching and normalization

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod record;
mod report;
mod slot;

pub use date_range::{DATE_FORMAT, DateRange, DayIterator, parse_date};
pub use error::{DateRangeError, ErcotError, Result, SchemaError};
pub use record::{RawRecord, RawRecordSet};
pub use report::{
    FieldKind, FlatColumn, FlatLayout, GridLayout, Market, QueryParams, RangeStyle, RecordFilter,
    ReportDefinition, ReportLayout,
};
pub use slot::{Granularity, GranularityParseError, INTERVAL_MINUTES, TimeSlot};
