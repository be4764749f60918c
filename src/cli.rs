//! Command-line interface definitions for du_scrape.
//!
//! Every option is optional; with none given each pipeline scrapes the live
//! DU pages and writes into `./results`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const EXIT_STATUS_HELP: &str = "Exit status: non-zero when the athletics or bulletin page cannot be fetched, \
or the bulletin file cannot be written. Calendar problems and athletics write \
failures are logged and do not change the exit status.";

/// Command-line arguments for du_scrape.
///
/// # Examples
///
/// ```sh
/// # Scrape the athletics scoreboard into ./results
/// du_scrape athletics
///
/// # Scrape a custom calendar range into another directory
/// du_scrape --output-dir /tmp/du calendar --start-date 2025-09-01 --end-date 2025-12-31
///
/// # Run every pipeline
/// du_scrape all
/// ```
///
/// # Exit Status
///
/// The process exits non-zero when a pipeline cannot produce its file: an
/// athletics or bulletin page that fails to download, or a bulletin file
/// that cannot be written. Every other problem is logged and the run exits
/// zero, possibly with an empty output file. `all` runs every pipeline before
/// reporting failures.
#[derive(Parser, Debug)]
#[command(author, version, about, after_help = EXIT_STATUS_HELP)]
pub struct Cli {
    /// Directory receiving the JSON files (overrides the config file)
    #[arg(short, long, global = true, env = "DU_SCRAPE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub pipeline: Pipeline,
}

/// Which scraper to run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Pipeline {
    /// Scoreboard events from denverpioneers.com
    Athletics,
    /// Upper-division CS courses without prerequisites
    Bulletin,
    /// Calendar events with detail-page descriptions
    Calendar(CalendarArgs),
    /// Run all three pipelines one after another
    All(CalendarArgs),
}

/// Date range overrides for the calendar search.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarArgs {
    /// First day to search, YYYY-MM-DD (default: January 1st of this year)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day to search, YYYY-MM-DD (default: December 31st of this year)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}
