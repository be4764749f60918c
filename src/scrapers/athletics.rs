//! Denver Pioneers athletics scoreboard scraper.
//!
//! The homepage at [denverpioneers.com](https://denverpioneers.com) renders its
//! scoreboard from a JSON object assigned inside an inline script:
//!
//! ```text
//! <section aria-labelledby="h2_scoreboard">
//!   <script>var obj = {"data":[...],"extra":{"school_name":"..."}}; if (...) {...}</script>
//! </section>
//! ```
//!
//! The object is cut out of the script with a string-aware brace scan rather
//! than a pattern over the trailing code, then handed to `serde_json`. Any
//! failure along the way yields zero events, and the run still writes an
//! (empty) output file.

use crate::config::AthleticsConfig;
use crate::fetch::fetch_page;
use crate::models::{AthleticEvents, EventRecord, DEFAULT_SCHOOL_NAME, UNKNOWN_DATE, UNKNOWN_OPPONENT};
use crate::outputs::json::{JsonStyle, write_json};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

static SCOREBOARD_SCRIPT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"section[aria-labelledby="h2_scoreboard"] script"#).unwrap());

static OBJ_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bvar\s+obj\s*=\s*").unwrap());

/// Run the athletics pipeline end to end.
///
/// # Returns
///
/// The number of events extracted.
///
/// # Errors
///
/// Only a failed page fetch aborts the run; a failed write is logged.
#[instrument(level = "info", skip_all, fields(url = %config.url))]
pub async fn run(client: &Client, config: &AthleticsConfig, output_dir: &Path) -> Result<usize, Box<dyn Error>> {
    let html = fetch_page(client, &config.url).await?;
    let events = parse_events(&html);

    if events.is_empty() {
        warn!("No events were extracted");
    }

    let count = events.len();
    let doc = AthleticEvents { events };
    match write_json(&doc, output_dir, &config.file_name, JsonStyle::TWO_SPACES).await {
        Ok(path) => info!(count, path = %path.display(), "Saved athletic events"),
        Err(e) => error!(error = %e, "Error saving athletic events"),
    }
    Ok(count)
}

/// Extract every scoreboard event from the homepage HTML.
///
/// Returns an empty list when the script, the assignment or the `data`
/// array is missing.
pub fn parse_events(html: &str) -> Vec<EventRecord> {
    let document = Html::parse_document(html);
    let script = document
        .select(&SCOREBOARD_SCRIPT)
        .next()
        .map(|el| el.text().collect::<String>());

    let Some(payload) = extract_event_data(script.as_deref()) else {
        warn!("No event data found");
        return Vec::new();
    };
    events_from_payload(&payload)
}

/// Pull the `var obj = {...}` object out of a script body and parse it.
///
/// Returns `None`, with a warning, when the script is absent, has no such
/// assignment, its braces never balance, or the captured text is not JSON.
pub fn extract_event_data(script: Option<&str>) -> Option<Value> {
    let Some(script) = script else {
        warn!("No script content found");
        return None;
    };

    let Some(assignment) = OBJ_ASSIGNMENT.find(script) else {
        warn!("No `var obj =` assignment found in script");
        return None;
    };

    let rest = &script[assignment.end()..];
    let Some(raw) = balanced_object(rest) else {
        warn!(
            preview = %truncate_for_log(rest, 120),
            "Assigned value is not a complete object"
        );
        return None;
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            debug!(bytes = raw.len(), "Parsed scoreboard payload");
            Some(value)
        }
        Err(e) => {
            warn!(error = %e, preview = %truncate_for_log(raw, 120), "JSON parse error");
            None
        }
    }
}

/// Return the prefix of `s` spanning one balanced `{...}` object.
///
/// `s` must start with `{` once leading whitespace is skipped. Braces that
/// appear inside string literals, including escaped quotes, are ignored.
pub fn balanced_object(s: &str) -> Option<&str> {
    let s = s.trim_start();
    if !s.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => in_string = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map the parsed payload to event records, defaulting missing fields.
pub fn events_from_payload(payload: &Value) -> Vec<EventRecord> {
    let Some(data) = payload.get("data").and_then(Value::as_array) else {
        warn!("Payload has no `data` array");
        return Vec::new();
    };

    let du_team = non_empty_str(payload.pointer("/extra/school_name")).unwrap_or(DEFAULT_SCHOOL_NAME);

    data.iter()
        .map(|event| EventRecord {
            du_team: du_team.to_string(),
            opponent: non_empty_str(event.pointer("/opponent/title"))
                .unwrap_or(UNKNOWN_OPPONENT)
                .to_string(),
            date: non_empty_str(event.get("date")).unwrap_or(UNKNOWN_DATE).to_string(),
        })
        .collect()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
