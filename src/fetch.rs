//! HTTP page fetching for the scrapers.
//!
//! Two policies are offered:
//!
//! - [`fetch_page`]: one attempt, errors propagate to the caller. Used by
//!   pipelines whose run is meaningless without the page.
//! - [`fetch_html`]: a fixed number of immediate attempts, each bounded by a
//!   timeout. Exhausting the attempts yields `None` so a caller can treat
//!   the page as "no data" and carry on.

use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Build the HTTP client shared by every pipeline in the process.
pub fn build_client(user_agent: &str) -> Result<Client, Box<dyn Error>> {
    let client = Client::builder().user_agent(user_agent).build()?;
    Ok(client)
}

/// Fetch a page body once.
///
/// Non-success HTTP statuses count as failures.
///
/// # Errors
///
/// Returns the underlying request error after logging it.
#[instrument(level = "info", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    info!("Fetching page");
    let t0 = Instant::now();
    let result: Result<String, reqwest::Error> = async {
        let response = client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
    .await;

    match result {
        Ok(body) => {
            info!(
                bytes = body.len(),
                elapsed_ms = t0.elapsed().as_millis(),
                "Fetched page"
            );
            Ok(body)
        }
        Err(e) => {
            error!(error = %e, "Error fetching URL");
            Err(e.into())
        }
    }
}

/// Fetch a page body with up to `retries` attempts of at most `timeout` each.
///
/// Attempts follow one another immediately. Every failure is logged with its
/// attempt number; `None` is returned once all attempts have failed.
#[instrument(level = "info", skip(client, timeout))]
pub async fn fetch_html(
    client: &Client,
    url: &str,
    retries: u32,
    timeout: Duration,
) -> Option<String> {
    for attempt in 1..=retries {
        let t0 = Instant::now();
        let result: Result<String, reqwest::Error> = async {
            let response = client
                .get(url)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        }
        .await;

        match result {
            Ok(body) => return Some(body),
            Err(e) => {
                warn!(
                    attempt,
                    max = retries,
                    elapsed_ms = t0.elapsed().as_millis(),
                    error = %e,
                    "Failed to fetch URL"
                );
            }
        }
    }

    error!(attempts = retries, "Giving up on URL");
    None
}
