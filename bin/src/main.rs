//! ercot CLI - ERCOT public report downloader.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::fetch::FetchArgs;
use display::CredentialArgs;

#[derive(Parser)]
#[command(name = "ercot")]
#[command(about = "Download ERCOT public reports as gap-filled tables", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a report and write it to CSV or TSV
    Fetch(FetchArgs),

    /// List available reports
    List {
        /// Filter by market (dam, rtm, forecast)
        #[arg(short, long)]
        market: Option<String>,

        /// Search pattern
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show report details
    Info {
        /// Report identifier
        report: String,
    },

    /// Check credentials and API connectivity
    Status {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
}

/// Install the log subscriber. `RUST_LOG` overrides the `-v` count.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Fetch(args) => commands::fetch::fetch(args, cli.quiet).await,
        Commands::List { market, search } => {
            commands::list::list_reports(market.as_deref(), search.as_deref())
        }
        Commands::Info { report } => commands::info::show_info(&report),
        Commands::Status { credentials } => commands::status::status(credentials).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_parses() {
        let cli = Cli::try_parse_from([
            "ercot", "fetch", "dam-spp", "-s", "2024-01-01", "-f", "tsv", "--username", "u",
            "--password", "p", "--api-key", "k",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Fetch(_))));
    }

    #[test]
    fn test_posted_window_requires_both_ends() {
        let result = Cli::try_parse_from([
            "ercot",
            "fetch",
            "wind-lz",
            "--posted-from",
            "2024-01-01T00:00:00",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_max_retries_help_describes_retries() {
        let cli = Cli::command();
        let fetch = cli.find_subcommand("fetch").unwrap();
        let arg = fetch
            .get_arguments()
            .find(|a| a.get_id() == "max_retries")
            .unwrap();
        assert_eq!(arg.get_help().unwrap().to_string(), "Maximum retries per request");
    }

    #[test]
    fn test_sced_time_window_flags_parse() {
        let cli = Cli::try_parse_from([
            "ercot",
            "fetch",
            "rtm-sced-lambda",
            "--time-from",
            "2024-01-05T13:15:00",
            "--time-to",
            "2024-01-05T14:00:00",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Fetch(_))));
    }
}
