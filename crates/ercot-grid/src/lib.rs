//! Time-series grid normalization for ERCOT report records.
//!
//! This crate turns sparse, per-record report responses into dense tables:
//!
//! - [`CanonicalTimeGrid`] - Every intraday slot of every day in a range
//! - [`GridNormalizer`] - Entity × time records to a gap-filled [`NormalizedTable`]
//! - [`reshape_flat`] / [`reshape_raw`] - Row tables for other report shapes

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod field;
mod flat;
mod grid;
mod normalizer;
mod table;

pub use flat::{Cell, RecordTable, reshape_flat, reshape_raw};
pub use grid::CanonicalTimeGrid;
pub use normalizer::GridNormalizer;
pub use table::{Column, NormalizedTable};
