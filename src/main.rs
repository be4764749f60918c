//! # du_scrape
//!
//! Scrapes three public University of Denver sites and saves structured
//! records as JSON:
//!
//! - **athletics**: scoreboard games from denverpioneers.com → `athletic_events.json`
//! - **bulletin**: upper-division CS courses with no prerequisites → `bulletin.json`
//! - **calendar**: calendar events with their detail descriptions → `calendar_events.json`
//!
//! ## Usage
//!
//! ```sh
//! du_scrape athletics
//! du_scrape calendar --start-date 2025-01-01 --end-date 2025-12-31
//! du_scrape -o ./out all
//! ```
//!
//! ## Architecture
//!
//! Each pipeline is independent and runs once:
//! 1. **Fetch**: download the page (the calendar retries up to 3 times)
//! 2. **Extract**: CSS selectors, or a JSON object embedded in a script
//! 3. **Transform**: map raw fields to records, defaulting what is missing
//! 4. **Write**: pretty-printed JSON in the output directory

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

#[cfg(test)]
mod test_support;

use cli::{CalendarArgs, Cli, Pipeline};
use config::{ScrapeConfig, load_config};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        warn!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable; pipelines will report their own write failures"
        );
    }

    let client = fetch::build_client(&config.user_agent)?;
    let result = run_pipeline(&args.pipeline, &client, &config).await;

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Scraping process failed"),
    }
    result
}

/// Fold CLI flags over the loaded configuration.
fn apply_overrides(config: &mut ScrapeConfig, args: &Cli) {
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    let dates = match &args.pipeline {
        Pipeline::Calendar(dates) | Pipeline::All(dates) => dates,
        Pipeline::Athletics | Pipeline::Bulletin => return,
    };
    let CalendarArgs { start_date, end_date } = dates;
    if start_date.is_some() {
        config.calendar.start_date = *start_date;
    }
    if end_date.is_some() {
        config.calendar.end_date = *end_date;
    }
}

async fn run_pipeline(
    pipeline: &Pipeline,
    client: &reqwest::Client,
    config: &ScrapeConfig,
) -> Result<(), Box<dyn Error>> {
    let out = config.output_dir.as_path();
    match pipeline {
        Pipeline::Athletics => {
            scrapers::athletics::run(client, &config.athletics, out).await?;
        }
        Pipeline::Bulletin => {
            let total = scrapers::bulletin::run(client, &config.bulletin, out).await?;
            info!(total, "Total courses found");
        }
        Pipeline::Calendar(_) => {
            scrapers::calendar::run(client, &config.calendar, out).await;
        }
        Pipeline::All(_) => {
            let mut failed = Vec::new();
            if let Err(e) = scrapers::athletics::run(client, &config.athletics, out).await {
                error!(error = %e, "Athletics pipeline failed");
                failed.push("athletics");
            }
            if let Err(e) = scrapers::bulletin::run(client, &config.bulletin, out).await {
                error!(error = %e, "Bulletin pipeline failed");
                failed.push("bulletin");
            }
            scrapers::calendar::run(client, &config.calendar, out).await;

            if !failed.is_empty() {
                return Err(format!("pipelines failed: {}", failed.join(", ")).into());
            }
        }
    }
    Ok(())
}
