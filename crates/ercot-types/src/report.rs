//! Report definitions: endpoint, query parameter names and record layout.

use serde::{Deserialize, Serialize};

use crate::Granularity;

/// Market a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Day-ahead market.
    Dam,
    /// Real-time market.
    Rtm,
    /// Load forecasts and renewable production.
    Forecast,
}

impl Market {
    /// Returns the market as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dam => "dam",
            Self::Rtm => "rtm",
            Self::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the range bounds of a report are rendered in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeStyle {
    /// `YYYY-MM-DD` delivery dates.
    #[default]
    Date,
    /// `YYYY-MM-DDTHH:MM:SS` timestamps covering whole days.
    Timestamp,
}

/// Query parameter names understood by a report endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Range start parameter (e.g. `deliveryDateFrom`).
    pub from: String,
    /// Range end parameter (e.g. `deliveryDateTo`).
    pub to: String,
    /// Rendering of the range bounds.
    #[serde(default)]
    pub range_style: RangeStyle,
    /// Single-entity filter parameter (e.g. `busName`), if supported.
    #[serde(default)]
    pub entity: Option<String>,
    /// Posted-datetime window start parameter, if supported.
    #[serde(default)]
    pub posted_from: Option<String>,
    /// Posted-datetime window end parameter, if supported.
    #[serde(default)]
    pub posted_to: Option<String>,
    /// Forecast model filter parameter, if supported.
    #[serde(default)]
    pub model: Option<String>,
    /// Page size parameter.
    #[serde(default = "default_size_param")]
    pub size: String,
}

fn default_size_param() -> String {
    "size".to_string()
}

/// Keeps only records whose field equals a fixed string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Field position to compare.
    pub field: usize,
    /// Required value.
    pub equals: String,
}

/// Field mapping for reports shaped as entity × time matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Exact field count of every record.
    pub width: usize,
    /// Entity key field (bus, settlement point, ...).
    pub entity: usize,
    /// Delivery date field.
    pub date: usize,
    /// Hour-ending field (API convention 1–24).
    pub hour: usize,
    /// Interval field (API convention 1–4) for sub-hourly reports.
    #[serde(default)]
    pub interval: Option<usize>,
    /// Numeric value field.
    pub value: usize,
    /// Optional record filter applied before normalization.
    #[serde(default)]
    pub filter: Option<RecordFilter>,
    /// Name of a derived row-wise mean column, if any.
    #[serde(default)]
    pub average: Option<String>,
}

impl GridLayout {
    /// Returns the grid granularity implied by the layout.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        if self.interval.is_some() {
            Granularity::FifteenMinute
        } else {
            Granularity::Hourly
        }
    }
}

/// Interpretation of one raw field in a flat report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Delivery date.
    Date,
    /// Hour-ending, remapped from 1–24 to 0–23.
    HourEnding,
    /// Settlement interval, remapped from 1–4 to minute offsets.
    Interval,
    /// Floating-point number.
    Number,
    /// Whole number (e.g. a voltage level in kV).
    Integer,
    /// Free text.
    Text,
    /// SCED timestamp, expanded into date, hour and minute columns.
    ScedTimestamp,
}

/// One output column of a flat report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatColumn {
    /// Source field position.
    pub field: usize,
    /// Output column name (ignored for SCED timestamps).
    #[serde(default)]
    pub name: String,
    /// How to interpret the field.
    pub kind: FieldKind,
}

/// Column mapping for reports that are kept as row tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLayout {
    /// Exact field count of every record.
    pub width: usize,
    /// Output columns; fields not listed are dropped.
    pub columns: Vec<FlatColumn>,
}

/// Record layout of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLayout {
    /// Entity × time matrix normalized onto the canonical grid.
    Grid(GridLayout),
    /// Row table with renamed, typed columns.
    Flat(FlatLayout),
    /// Records passed through unchanged.
    Raw,
}

/// A public report endpoint and how to shape its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Unique identifier (e.g., "dam-spp").
    id: String,
    /// Human-readable name.
    name: String,
    /// Description of the report.
    description: String,
    /// Market the report belongs to.
    market: Market,
    /// Endpoint URL.
    url: String,
    /// Query parameter names.
    params: QueryParams,
    /// Record layout.
    layout: ReportLayout,
}

impl ReportDefinition {
    /// Creates a new report definition.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        market: Market,
        url: impl Into<String>,
        params: QueryParams,
        layout: ReportLayout,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            market,
            url: url.into(),
            params,
            layout,
        }
    }

    /// Returns the report identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the market.
    #[must_use]
    pub const fn market(&self) -> Market {
        self.market
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns a copy of this definition pointing at another endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns the query parameter names.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Returns the record layout.
    #[must_use]
    pub const fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Returns the grid granularity for grid reports.
    #[must_use]
    pub const fn granularity(&self) -> Option<Granularity> {
        match &self.layout {
            ReportLayout::Grid(grid) => Some(grid.granularity()),
            _ => None,
        }
    }

    /// Returns true if the report supports a single-entity filter.
    #[must_use]
    pub const fn has_entity_filter(&self) -> bool {
        self.params.entity.is_some()
    }
}

impl std::fmt::Display for ReportDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
