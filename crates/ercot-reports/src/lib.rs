//! Report registry for the ERCOT public reports client.
//!
//! This crate provides the catalogue of supported public report endpoints,
//! each with its query parameter names and record layout.
//!
//! # Example
//!
//! ```
//! use ercot_reports::ReportRegistry;
//!
//! let registry = ReportRegistry::global();
//!
//! // Lookup by ID
//! if let Some(report) = registry.get("dam-spp") {
//!     println!("{}: {}", report.name(), report.url());
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gridtape/ercot/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::OnceLock;

use ercot_types::{Market, ReportDefinition, ReportLayout};

/// The report metadata JSON embedded at compile time.
const REPORTS_JSON: &str = include_str!("../data/reports.json");

/// Global report registry instance.
static REGISTRY: OnceLock<ReportRegistry> = OnceLock::new();

/// Registry of all supported public reports.
#[derive(Debug)]
pub struct ReportRegistry {
    reports: HashMap<String, ReportDefinition>,
}

impl ReportRegistry {
    /// Returns the global report registry.
    ///
    /// The registry is initialized lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(Self::load)
    }

    /// Loads reports from the embedded JSON data.
    fn load() -> Self {
        let reports: HashMap<String, ReportDefinition> =
            serde_json::from_str(REPORTS_JSON).expect("Invalid reports.json");
        Self { reports }
    }

    /// Creates a registry from explicit definitions.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = ReportDefinition>) -> Self {
        let reports = definitions
            .into_iter()
            .map(|d| (d.id().to_lowercase(), d))
            .collect();
        Self { reports }
    }

    /// Looks up a report by ID (case-insensitive).
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ReportDefinition> {
        self.reports.get(&id.to_lowercase())
    }

    /// Returns all reports as an iterator.
    pub fn all(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.reports.values()
    }

    /// Returns the total number of reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Returns reports belonging to the given market.
    pub fn by_market(&self, market: Market) -> impl Iterator<Item = &ReportDefinition> {
        self.reports.values().filter(move |r| r.market() == market)
    }

    /// Returns reports that normalize onto a time grid.
    pub fn grid_reports(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.reports
            .values()
            .filter(|r| matches!(r.layout(), ReportLayout::Grid(_)))
    }

    /// Searches reports by ID or name pattern (case-insensitive).
    pub fn search(&self, pattern: &str) -> Vec<&ReportDefinition> {
        let pattern = pattern.to_lowercase();
        self.reports
            .values()
            .filter(|r| {
                r.id().to_lowercase().contains(&pattern)
                    || r.name().to_lowercase().contains(&pattern)
            })
            .collect()
    }

    /// Returns all report IDs sorted alphabetically.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.reports.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }
}
