//! DU events calendar scraper.
//!
//! Scrapes a date-ranged search of the [DU calendar](https://www.du.edu/calendar)
//! in two rounds:
//!
//! 1. **Listing**: every `.events-listing__item` yields a title, date, optional
//!    time and optional detail link.
//! 2. **Details**: each item with a link has its detail page fetched, at most
//!    `detail_concurrency` at a time, and the `.description` text merged back
//!    into the item in listing order.
//!
//! Fetches use the retrying fetcher; a page that cannot be fetched is treated
//! as having no data rather than failing the run.

use crate::config::CalendarConfig;
use crate::fetch::fetch_html;
use crate::models::{CalendarEventRecord, CalendarEvents};
use crate::outputs::json::{JsonStyle, write_json};
use crate::scrapers::{element_text, select_text};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

static LISTING_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse(".events-listing__item").unwrap());
static ITEM_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static ITEM_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static CLOCK_ICON: Lazy<Selector> = Lazy::new(|| Selector::parse(".icon-du-clock").unwrap());
static EVENT_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.event-card").unwrap());
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| Selector::parse(".description").unwrap());

/// Run the calendar pipeline end to end.
///
/// Never fails: fetch problems yield fewer or emptier records and a failed
/// write is logged.
///
/// # Returns
///
/// The number of events extracted.
#[instrument(level = "info", skip_all)]
pub async fn run(client: &Client, config: &CalendarConfig, output_dir: &Path) -> usize {
    let events = scrape_events(client, config).await;
    let count = events.len();

    let doc = CalendarEvents { events };
    match write_json(&doc, output_dir, &config.file_name, JsonStyle::FOUR_SPACES).await {
        Ok(path) => info!(count, path = %path.display(), "Scraping completed"),
        Err(e) => error!(error = %e, "Failed to save calendar events"),
    }
    count
}

/// Fetch the listing and every detail page, returning merged records.
pub async fn scrape_events(client: &Client, config: &CalendarConfig) -> Vec<CalendarEventRecord> {
    let listing_url = config.listing_url();
    info!(url = %listing_url, "Fetching calendar listing");

    let Some(html) = fetch_html(client, &listing_url, config.retries, config.timeout()).await else {
        return Vec::new();
    };

    let Ok(base) = Url::parse(&config.base_url) else {
        error!(base_url = %config.base_url, "Invalid calendar base URL");
        return Vec::new();
    };

    let mut events = parse_listing(&html, &base);
    info!(count = events.len(), "Found events");

    info!(concurrency = config.detail_concurrency, "Fetching event descriptions in parallel");
    let descriptions = fetch_descriptions(
        client,
        &events,
        config.retries,
        config.timeout(),
        config.detail_concurrency,
    )
    .await;

    for (event, description) in events.iter_mut().zip(descriptions) {
        event.description = description;
    }
    events
}

/// Parse listing items from the calendar page, resolving links against `base`.
///
/// Items missing a clock icon get `time: None`; items without an event link
/// get `full_event_url: None`.
pub fn parse_listing(html: &str, base: &Url) -> Vec<CalendarEventRecord> {
    let document = Html::parse_document(html);
    document
        .select(&LISTING_ITEM)
        .map(|item| CalendarEventRecord {
            title: select_text(item, &ITEM_TITLE),
            date: item
                .select(&ITEM_DATE)
                .next()
                .map(element_text)
                .unwrap_or_default(),
            time: event_time(item),
            full_event_url: event_url(item, base),
            description: None,
        })
        .collect()
}

/// Text of the element wrapping the clock icon.
fn event_time(item: ElementRef<'_>) -> Option<String> {
    let icon = item.select(&CLOCK_ICON).next()?;
    let parent = icon.parent().and_then(ElementRef::wrap)?;
    Some(element_text(parent))
}

fn event_url(item: ElementRef<'_>, base: &Url) -> Option<String> {
    let href = item.select(&EVENT_LINK).next()?.value().attr("href")?;
    resolve_event_url(base, href)
}

/// Qualify a possibly relative event link against the site origin.
///
/// Links starting with `http` are returned exactly as written. Root-relative
/// links, including `//`-prefixed ones, are appended to the origin so they
/// always stay on the site; other relative links are joined to `base`.
///
/// # Examples
///
/// ```ignore
/// let base = Url::parse("https://www.du.edu").unwrap();
/// assert_eq!(resolve_event_url(&base, "/events/x").as_deref(), Some("https://www.du.edu/events/x"));
/// ```
pub fn resolve_event_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    if href.starts_with('/') {
        let origin = base.origin().ascii_serialization();
        return Some(format!("{}{}", origin, href));
    }
    match base.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!(%href, error = %e, "Unresolvable event link");
            None
        }
    }
}

/// Fetch the description of every event that has a detail URL.
///
/// The result lines up index for index with `events`. Events without a URL
/// are answered with `None` and never fetched. At most `concurrency` fetches
/// run at once; every fetch finishes before this returns.
pub async fn fetch_descriptions(
    client: &Client,
    events: &[CalendarEventRecord],
    retries: u32,
    timeout: Duration,
    concurrency: usize,
) -> Vec<Option<String>> {
    stream::iter(events)
        .map(|event| async move {
            match event.full_event_url.as_deref() {
                Some(url) => fetch_description(client, url, retries, timeout).await,
                None => None,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[instrument(level = "info", skip(client, retries, timeout))]
async fn fetch_description(client: &Client, url: &str, retries: u32, timeout: Duration) -> Option<String> {
    let html = fetch_html(client, url, retries, timeout).await?;
    info!("Scraping event details");
    parse_description(&html)
}

/// Trimmed `.description` text of a detail page; `None` when missing or empty.
pub fn parse_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let text = select_text(document.root_element(), &DESCRIPTION);
    (!text.is_empty()).then_some(text)
}
