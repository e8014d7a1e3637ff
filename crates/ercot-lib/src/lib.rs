//! Client library for ERCOT public reports.
//!
//! This is a facade crate that re-exports functionality from the workspace
//! crates and adds [`ReportClient`], which fetches a registered report and
//! shapes it into a table.
//!
//! # Quick Start
//!
//! ```no_run
//! use ercot_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let mut client = ReportClient::connect(Credentials::from_env()?).await?;
//!
//!     let report = ReportRegistry::global().get("rtm-spp-hub").unwrap();
//!     let query = ReportQuery::range(DateRange::parse("2024-01-01", "2024-01-07")?);
//!     let table = client.fetch_report(report, &query).await?;
//!
//!     println!("{} rows", table.row_count());
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(all(feature = "fetch", feature = "grid"))]
mod report;

// Re-export core types
pub use ercot_types::*;

// Re-export report registry
pub use ercot_reports::ReportRegistry;

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use ercot_fetch::{
    AuthConfig, ClientConfig, Credentials, PageProgress, PageRequest, PagedFetcher, Token,
    TokenManager,
};

// Re-export normalization
#[cfg(feature = "grid")]
pub use ercot_grid::{
    CanonicalTimeGrid, Cell, Column, GridNormalizer, NormalizedTable, RecordTable, reshape_flat,
    reshape_raw,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use ercot_format::{CsvFormatter, FormatError, Formatter, OutputFormat};

#[cfg(all(feature = "fetch", feature = "grid"))]
pub use report::{DEFAULT_PAGE_SIZE, ReportClient, ReportQuery, ReportTable, shape_records};

/// Prelude module for convenient imports.
///
/// ```
/// use ercot_lib::prelude::*;
/// ```
pub mod prelude {
    pub use ercot_types::{
        DateRange, DateRangeError, ErcotError, Granularity, Market, RawRecordSet,
        ReportDefinition, Result, TimeSlot,
    };

    pub use ercot_reports::ReportRegistry;

    #[cfg(feature = "fetch")]
    pub use ercot_fetch::{ClientConfig, Credentials, PagedFetcher, TokenManager};

    #[cfg(feature = "grid")]
    pub use ercot_grid::{GridNormalizer, NormalizedTable, RecordTable};

    #[cfg(feature = "format")]
    pub use ercot_format::{CsvFormatter, Formatter, OutputFormat};

    #[cfg(all(feature = "fetch", feature = "grid"))]
    pub use crate::report::{ReportClient, ReportQuery, ReportTable};
}
