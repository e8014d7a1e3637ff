//! Display utilities and shared argument handling for the ercot CLI.

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::{Args, ValueEnum};
use ercot_lib::prelude::*;
use ercot_lib::ReportLayout;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, PasswordDisplayMode};

/// Output format for fetched reports.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Tsv,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Returns a formatter writing this format.
    pub(crate) const fn formatter(self) -> CsvFormatter {
        match self {
            Self::Csv => CsvFormatter::new(),
            Self::Tsv => CsvFormatter::tsv(),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// API credentials, taken from flags, the environment or `.env`.
#[derive(Args)]
pub(crate) struct CredentialArgs {
    /// API account username
    #[arg(long, env = "ERCOT_USERNAME")]
    username: Option<String>,

    /// API account password (prompted for when omitted)
    #[arg(long, env = "ERCOT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// API subscription key
    #[arg(long, env = "ERCOT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl CredentialArgs {
    /// Resolves the credentials, prompting for a missing password.
    pub(crate) fn resolve(self) -> Result<Credentials> {
        let Some(username) = self.username else {
            bail!("No username given. Pass --username or set ERCOT_USERNAME");
        };
        let Some(api_key) = self.api_key else {
            bail!("No subscription key given. Pass --api-key or set ERCOT_API_KEY");
        };
        let password = match self.password {
            Some(password) => password,
            None => Password::new(&format!("Password for {username}:"))
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()
                .context("Password prompt cancelled")?,
        };
        Ok(Credentials::new(username, password, api_key))
    }
}

/// Creates the page progress bar, hidden in quiet mode.
pub(crate) fn page_progress(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_message(message);
    pb
}

/// Parse a market string into a Market enum.
pub(crate) fn parse_market(s: &str) -> Result<Market> {
    match s.to_lowercase().as_str() {
        "dam" => Ok(Market::Dam),
        "rtm" => Ok(Market::Rtm),
        "forecast" => Ok(Market::Forecast),
        _ => bail!("Unknown market: {s}. Valid options: dam, rtm, forecast"),
    }
}

/// Parse a datetime flag (`YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`).
pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .with_context(|| format!("Invalid datetime: {s}"))
}

/// Short name of a report's record layout.
pub(crate) fn layout_name(report: &ReportDefinition) -> String {
    match report.layout() {
        ReportLayout::Grid(grid) => format!("grid ({})", grid.granularity()),
        ReportLayout::Flat(_) => "flat".to_string(),
        ReportLayout::Raw => "raw".to_string(),
    }
}
