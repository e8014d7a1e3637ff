//! Output formatters for ERCOT report tables.
//!
//! This crate provides formatters for writing normalized grid tables and
//! flat record tables:
//!
//! - [`CsvFormatter`] - CSV and TSV output, plus reading grid tables back
//! - [`Formatter`] - The formatter trait
//! - [`OutputFormat`] - Format identifiers for the command line

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
