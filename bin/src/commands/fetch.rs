//! Fetch command implementation.
//!
//! This module handles fetching a report page by page and writing the shaped
//! table to a CSV or TSV file.

use crate::display::{CredentialArgs, Format, page_progress, parse_datetime};
use anyhow::{Context, Result, bail};
use clap::Args;
use ercot_lib::prelude::*;
use ercot_lib::{AuthConfig, DATE_FORMAT, DEFAULT_PAGE_SIZE, PageProgress, parse_date};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::debug;

/// Arguments of the `fetch` command.
#[derive(Args)]
pub(crate) struct FetchArgs {
    /// Report identifier (e.g., dam-spp, rtm-spp-hub)
    report: String,

    /// Start delivery date (YYYY-MM-DD)
    #[arg(short, long)]
    start: Option<String>,

    /// End delivery date (YYYY-MM-DD). Defaults to the start date.
    #[arg(short, long)]
    end: Option<String>,

    /// Exact SCED range start (YYYY-MM-DDTHH:MM:SS), overriding --start
    #[arg(long)]
    time_from: Option<String>,

    /// Exact SCED range end (YYYY-MM-DDTHH:MM:SS), overriding --end
    #[arg(long)]
    time_to: Option<String>,

    /// Single entity to request (bus, settlement point or constraint)
    #[arg(long)]
    entity: Option<String>,

    /// Posted datetime window start (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, requires = "posted_to")]
    posted_from: Option<String>,

    /// Posted datetime window end (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, requires = "posted_from")]
    posted_to: Option<String>,

    /// Forecast model filter
    #[arg(long)]
    model: Option<String>,

    /// Records per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    size: u32,

    /// Output file path. Defaults to <report>_<start>.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Maximum retries per request
    #[arg(long, default_value = "5")]
    max_retries: u32,

    #[command(flatten)]
    credentials: CredentialArgs,
}

impl FetchArgs {
    fn query(&self) -> Result<ReportQuery> {
        let from = self
            .start
            .as_deref()
            .map(parse_date)
            .transpose()
            .context("Invalid start date")?;
        let to = match self.end.as_deref() {
            Some(s) => Some(parse_date(s).context("Invalid end date")?),
            None => from,
        };
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            bail!("Start date {from} is after end date {to}");
        }

        Ok(ReportQuery {
            from,
            to,
            time_from: self.time_from.as_deref().map(parse_datetime).transpose()?,
            time_to: self.time_to.as_deref().map(parse_datetime).transpose()?,
            entity: self.entity.clone(),
            posted_from: self.posted_from.as_deref().map(parse_datetime).transpose()?,
            posted_to: self.posted_to.as_deref().map(parse_datetime).transpose()?,
            model: self.model.clone(),
            size: self.size,
        })
    }

    fn output_path(&self, report: &ReportDefinition, query: &ReportQuery) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = match query.from {
                Some(from) => format!("{}_{}", report.id(), from.format(DATE_FORMAT)),
                None => report.id().to_string(),
            };
            PathBuf::from(format!("{stem}.{}", self.format.extension()))
        })
    }
}

/// Fetch a report and write it to a file.
pub(crate) async fn fetch(args: FetchArgs, quiet: bool) -> Result<()> {
    let registry = ReportRegistry::global();
    let report = registry.get(&args.report).with_context(|| {
        format!(
            "Unknown report: {}. Run `ercot list` to see available reports",
            args.report
        )
    })?;

    let query = args.query()?;
    // Validate before prompting for a password.
    query.to_request(report)?;
    let output = args.output_path(report, &query);

    let config = ClientConfig {
        max_retries: args.max_retries,
        ..Default::default()
    };
    let credentials = args.credentials.resolve()?;
    let mut client = ReportClient::connect_with(credentials, AuthConfig::default(), config)
        .await
        .context("Failed to authenticate")?;

    let message = match query.date_range() {
        Some(range) => format!("{} {range}", report.id()),
        None => report.id().to_string(),
    };
    let progress = page_progress(quiet, message);

    let table = client
        .fetch_report_with_progress(report, &query, |p: PageProgress| {
            progress.set_length(u64::from(p.total_pages));
            progress.set_position(u64::from(p.page));
        })
        .await
        .with_context(|| format!("Failed to fetch {}", report.id()))?;

    progress.finish_with_message(format!("Fetched {} rows", table.row_count()));

    debug!(output = %output.display(), format = %args.format, "Writing table");
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    table
        .write(&args.format.formatter(), BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !quiet {
        println!("Output written to: {}", output.display());
    }

    Ok(())
}
