//! Runtime configuration for the scraping pipelines.
//!
//! Every field has a default matching the public DU pages the scrapers were
//! written against, so running without a config file scrapes the live sites.
//! A YAML file passed with `--config` may override any subset of fields:
//!
//! ```yaml
//! output_dir: ./results
//! calendar:
//!   start_date: 2025-01-01
//!   end_date: 2025-12-31
//!   detail_concurrency: 4
//! ```

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration shared by all pipelines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Directory receiving every JSON output file.
    pub output_dir: PathBuf,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    pub athletics: AthleticsConfig,
    pub bulletin: BulletinConfig,
    pub calendar: CalendarConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            athletics: AthleticsConfig::default(),
            bulletin: BulletinConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

/// Settings for the athletics scoreboard pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AthleticsConfig {
    pub url: String,
    pub file_name: String,
}

impl Default for AthleticsConfig {
    fn default() -> Self {
        Self {
            url: "https://denverpioneers.com".to_string(),
            file_name: "athletic_events.json".to_string(),
        }
    }
}

/// Settings for the course bulletin pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BulletinConfig {
    pub url: String,
    pub file_name: String,
    /// Subject prefix a course block must carry, compared case-insensitively.
    pub subject: String,
    /// Lowest course number counted as upper-division.
    pub min_course_number: u32,
}

impl Default for BulletinConfig {
    fn default() -> Self {
        Self {
            url: "https://bulletin.du.edu/undergraduate/majorsminorscoursedescriptions/traditionalbachelorsprogrammajorandminors/computerscience/#coursedescriptionstext".to_string(),
            file_name: "bulletin.json".to_string(),
            subject: "COMP".to_string(),
            min_course_number: 3000,
        }
    }
}

/// Settings for the events calendar pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Site origin; relative event links are resolved against it.
    pub base_url: String,
    pub file_name: String,
    /// Free-text search term, empty for all events.
    pub search: String,
    /// First day of the range; defaults to January 1st of the current year.
    pub start_date: Option<NaiveDate>,
    /// Last day of the range; defaults to December 31st of the current year.
    pub end_date: Option<NaiveDate>,
    /// Attempts per page before giving up on it.
    pub retries: u32,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of detail pages fetched at once.
    pub detail_concurrency: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.du.edu".to_string(),
            file_name: "calendar_events.json".to_string(),
            search: String::new(),
            start_date: None,
            end_date: None,
            retries: 3,
            timeout_secs: 5,
            detail_concurrency: 8,
        }
    }
}

impl CalendarConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The inclusive date range to search, filling gaps with the current year.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let year = Local::now().year();
        let start = self
            .start_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
            .unwrap_or_default();
        let end = self
            .end_date
            .or_else(|| NaiveDate::from_ymd_opt(year, 12, 31))
            .unwrap_or_default();
        (start, end)
    }

    /// Build the listing URL for the configured search and date range.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // https://www.du.edu/calendar?search=&start_date=2025-01-01&end_date=2025-12-31#events-listing-date-filter-anchor
    /// let url = config.calendar.listing_url();
    /// ```
    pub fn listing_url(&self) -> String {
        let (start, end) = self.date_range();
        format!(
            "{}/calendar?search={}&start_date={}&end_date={}#events-listing-date-filter-anchor",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.search),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }
}

/// Load configuration from a YAML file, or fall back to defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`ScrapeConfig`].
#[instrument(level = "info")]
pub fn load_config(path: Option<&Path>) -> Result<ScrapeConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(ScrapeConfig::default());
    };
    let raw = std::fs::read_to_string(path)?;
    let config: ScrapeConfig = serde_yaml::from_str(&raw)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
