//! Fetch-and-shape runtime for registered reports.

use chrono::{NaiveDate, NaiveDateTime};
use ercot_fetch::{
    AuthConfig, ClientConfig, Credentials, PageProgress, PageRequest, PagedFetcher, TokenManager,
};
use ercot_grid::{GridNormalizer, NormalizedTable, RecordTable, reshape_flat, reshape_raw};
use ercot_reports::ReportRegistry;
use ercot_types::{
    DATE_FORMAT, DateRange, ErcotError, RangeStyle, RawRecordSet, ReportDefinition, ReportLayout,
    Result,
};
use tracing::info;

/// Page size requested when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 200_000;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Query values for one report request.
///
/// Values left unset are omitted from the request entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// First delivery date.
    pub from: Option<NaiveDate>,
    /// Last delivery date (inclusive).
    pub to: Option<NaiveDate>,
    /// Exact range start for timestamp-range reports, overriding `from`.
    pub time_from: Option<NaiveDateTime>,
    /// Exact range end for timestamp-range reports, overriding `to`.
    pub time_to: Option<NaiveDateTime>,
    /// Single entity to request (bus, settlement point, constraint).
    pub entity: Option<String>,
    /// Posted-datetime window start.
    pub posted_from: Option<NaiveDateTime>,
    /// Posted-datetime window end.
    pub posted_to: Option<NaiveDateTime>,
    /// Forecast model filter.
    pub model: Option<String>,
    /// Records per page.
    pub size: u32,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            time_from: None,
            time_to: None,
            entity: None,
            posted_from: None,
            posted_to: None,
            model: None,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReportQuery {
    /// Creates a query covering `range`.
    #[must_use]
    pub fn range(range: DateRange) -> Self {
        Self {
            from: Some(range.start),
            to: Some(range.end),
            ..Self::default()
        }
    }

    /// Creates a query for a single delivery date.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self::range(DateRange::single_day(date))
    }

    /// Restricts the query to one entity.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Sets exact timestamp bounds for SCED reports.
    ///
    /// Reports whose range is given as dates reject this window.
    #[must_use]
    pub const fn with_time_window(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.time_from = Some(from);
        self.time_to = Some(to);
        self
    }

    /// Sets the posted-datetime window.
    #[must_use]
    pub const fn with_posted(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.posted_from = Some(from);
        self.posted_to = Some(to);
        self
    }

    /// Sets the forecast model filter.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Returns the delivery date range, if both ends are set.
    #[must_use]
    pub fn date_range(&self) -> Option<DateRange> {
        Some(DateRange::between(self.from?, self.to?))
    }

    /// Builds the page request for `report`.
    ///
    /// # Errors
    ///
    /// Returns [`ErcotError::InvalidQuery`] if a grid report lacks either date
    /// or the query sets a filter the report does not support.
    pub fn to_request(&self, report: &ReportDefinition) -> Result<PageRequest> {
        if matches!(report.layout(), ReportLayout::Grid(_)) && self.date_range().is_none() {
            return Err(missing_dates(report));
        }

        let params = report.params();
        let render =
            |ts: Option<NaiveDateTime>| ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string());
        let (from, to) = match params.range_style {
            RangeStyle::Date if self.time_from.is_some() || self.time_to.is_some() => {
                return Err(ErcotError::InvalidQuery(format!(
                    "{} takes delivery dates, not a timestamp window",
                    report.id()
                )));
            }
            RangeStyle::Date => (
                self.from.map(|d| d.format(DATE_FORMAT).to_string()),
                self.to.map(|d| d.format(DATE_FORMAT).to_string()),
            ),
            RangeStyle::Timestamp => (
                render(self.time_from)
                    .or_else(|| self.from.map(|d| format!("{}T00:00:00", d.format(DATE_FORMAT)))),
                render(self.time_to)
                    .or_else(|| self.to.map(|d| format!("{}T23:59:59", d.format(DATE_FORMAT)))),
            ),
        };

        let optional = |name: &Option<String>, value: Option<String>, what: &str| {
            match (name, value) {
                (Some(name), value) => Ok(Some((name.clone(), value))),
                (None, None) => Ok(None),
                (None, Some(_)) => Err(ErcotError::InvalidQuery(format!(
                    "{} does not accept a {what} filter",
                    report.id()
                ))),
            }
        };
        let mut pairs = vec![(params.from.clone(), from), (params.to.clone(), to)];
        pairs.extend(optional(&params.entity, self.entity.clone(), "entity")?);
        pairs.extend(optional(&params.posted_from, render(self.posted_from), "posted-from")?);
        pairs.extend(optional(&params.posted_to, render(self.posted_to), "posted-to")?);
        pairs.extend(optional(&params.model, self.model.clone(), "model")?);
        pairs.push((params.size.clone(), Some(self.size.to_string())));

        Ok(PageRequest::new(report.url(), pairs))
    }
}

fn missing_dates(report: &ReportDefinition) -> ErcotError {
    ErcotError::InvalidQuery(format!("{} needs both a start and an end date", report.id()))
}

/// A shaped report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportTable {
    /// Entity × time grid.
    Grid(NormalizedTable),
    /// Flat or raw row table.
    Records(RecordTable),
}

impl ReportTable {
    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Grid(table) => table.row_count(),
            Self::Records(table) => table.row_count(),
        }
    }

    /// Returns the grid table, if this is a grid report.
    #[must_use]
    pub const fn as_grid(&self) -> Option<&NormalizedTable> {
        match self {
            Self::Grid(table) => Some(table),
            Self::Records(_) => None,
        }
    }

    /// Returns the row table, if this is a flat or raw report.
    #[must_use]
    pub const fn as_records(&self) -> Option<&RecordTable> {
        match self {
            Self::Grid(_) => None,
            Self::Records(table) => Some(table),
        }
    }

    /// Writes the table with `formatter`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    #[cfg(feature = "format")]
    pub fn write<F, W>(
        &self,
        formatter: &F,
        writer: W,
    ) -> std::result::Result<(), ercot_format::FormatError>
    where
        F: ercot_format::Formatter,
        W: std::io::Write + Send,
    {
        match self {
            Self::Grid(table) => formatter.write_table(table, writer),
            Self::Records(table) => formatter.write_records(table, writer),
        }
    }
}

/// Shapes fetched records according to the report layout.
///
/// Grid reports are normalized over the query's date range, with the queried
/// entity (if any) always present as a column.
///
/// # Errors
///
/// Returns [`ErcotError::InvalidQuery`] if a grid report lacks either date,
/// or a schema error if the records do not match the layout.
pub fn shape_records(
    report: &ReportDefinition,
    query: &ReportQuery,
    records: &RawRecordSet,
) -> Result<ReportTable> {
    match report.layout() {
        ReportLayout::Grid(layout) => {
            let range = query.date_range().ok_or_else(|| missing_dates(report))?;
            let table = GridNormalizer::new(layout.clone())
                .with_requested(query.entity.iter().cloned())
                .normalize(records, range)?;
            Ok(ReportTable::Grid(table))
        }
        ReportLayout::Flat(layout) => Ok(ReportTable::Records(reshape_flat(layout, records)?)),
        ReportLayout::Raw => Ok(ReportTable::Records(reshape_raw(records))),
    }
}

/// Authenticated client that fetches and shapes registered reports.
#[derive(Debug)]
pub struct ReportClient {
    fetcher: PagedFetcher,
    tokens: TokenManager,
}

impl ReportClient {
    /// Creates a client from its parts.
    #[must_use]
    pub const fn new(fetcher: PagedFetcher, tokens: TokenManager) -> Self {
        Self { fetcher, tokens }
    }

    /// Acquires a token with default settings and returns a ready client.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credentials are rejected.
    pub async fn connect(credentials: Credentials) -> Result<Self> {
        Self::connect_with(credentials, AuthConfig::default(), ClientConfig::default()).await
    }

    /// Acquires a token with explicit settings and returns a ready client.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credentials are rejected.
    pub async fn connect_with(
        credentials: Credentials,
        auth: AuthConfig,
        config: ClientConfig,
    ) -> Result<Self> {
        let fetcher = PagedFetcher::new(config)?;
        let mut tokens = TokenManager::with_client(credentials, auth, fetcher.http().clone());
        tokens.acquire(chrono::Utc::now()).await?;
        Ok(Self::new(fetcher, tokens))
    }

    /// Returns the token manager.
    #[must_use]
    pub const fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Returns the token manager for credential updates or explicit refresh.
    pub const fn tokens_mut(&mut self) -> &mut TokenManager {
        &mut self.tokens
    }

    /// Returns the page fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &PagedFetcher {
        &self.fetcher
    }

    /// Probes the API and returns the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained or the probe cannot be sent.
    pub async fn connection_status(&mut self) -> Result<u16> {
        self.fetcher.connection_status(&mut self.tokens).await
    }

    /// Fetches the raw records of `report`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid or the fetch fails.
    pub async fn fetch_records(
        &mut self,
        report: &ReportDefinition,
        query: &ReportQuery,
        on_page: impl FnMut(PageProgress),
    ) -> Result<RawRecordSet> {
        let request = query.to_request(report)?;
        info!(report = report.id(), url = %request.url(), "Fetching report");
        self.fetcher
            .fetch_with_progress(&mut self.tokens, &request, on_page)
            .await
    }

    /// Fetches `report` and shapes it according to its layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid, the fetch fails, or the
    /// records do not match the layout.
    pub async fn fetch_report(
        &mut self,
        report: &ReportDefinition,
        query: &ReportQuery,
    ) -> Result<ReportTable> {
        self.fetch_report_with_progress(report, query, |_| {}).await
    }

    /// Like [`ReportClient::fetch_report`], reporting page progress.
    ///
    /// # Errors
    ///
    /// See [`ReportClient::fetch_report`].
    pub async fn fetch_report_with_progress(
        &mut self,
        report: &ReportDefinition,
        query: &ReportQuery,
        on_page: impl FnMut(PageProgress),
    ) -> Result<ReportTable> {
        let records = self.fetch_records(report, query, on_page).await?;
        shape_records(report, query, &records)
    }

    /// Looks up `id` in the global registry and fetches it.
    ///
    /// # Errors
    ///
    /// Returns [`ErcotError::UnknownReport`] for an unregistered id, otherwise
    /// see [`ReportClient::fetch_report`].
    pub async fn fetch_report_by_id(
        &mut self,
        id: &str,
        query: &ReportQuery,
    ) -> Result<ReportTable> {
        let report = ReportRegistry::global()
            .get(id)
            .ok_or_else(|| ErcotError::UnknownReport(id.to_string()))?;
        self.fetch_report(report, query).await
    }
}
