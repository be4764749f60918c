//! DU course bulletin scraper.
//!
//! Collects upper-division courses that state no prerequisites from the
//! computer science page of the undergraduate bulletin. Every course is
//! rendered as a block:
//!
//! ```text
//! <div class="courseblock">
//!   <p class="courseblocktitle">COMP 3800. Advanced Topics.</p>
//!   <p class="courseblockdesc">Covers advanced topics. Prerequisite: COMP 2000.</p>
//! </div>
//! ```
//!
//! # Title Grammar
//!
//! ```text
//! title   := SUBJECT WS NUMBER ["."] [WS] name [terminator] ...
//! SUBJECT := letters
//! NUMBER  := digits
//! name    := text up to the first "." or a "(N Credits)" annotation
//! ```
//!
//! Blocks that do not fit the grammar are skipped, never guessed at.

use crate::config::BulletinConfig;
use crate::fetch::fetch_page;
use crate::models::{Bulletin, CourseRecord};
use crate::outputs::json::{JsonStyle, write_json};
use crate::scrapers::select_text;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};

static COURSE_BLOCK: Lazy<Selector> = Lazy::new(|| Selector::parse(".courseblock").unwrap());
static COURSE_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".courseblocktitle").unwrap());
static COURSE_DESC: Lazy<Selector> = Lazy::new(|| Selector::parse(".courseblockdesc").unwrap());

static TITLE_GRAMMAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*(?P<subject>[A-Za-z]+)\s+(?P<number>\d+)\.?\s*(?P<rest>.*)$").unwrap());
static CREDITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\(\s*[\d.\-]+\s+credits?\s*\)").unwrap());
static NO_PREREQUISITES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bno\s+prerequisites?\b|\bprerequisites?\s*:\s*none\b").unwrap());

/// Subject, number and name parsed from a course block title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTitle {
    pub subject: String,
    pub number: u32,
    pub name: String,
}

impl CourseTitle {
    /// Identifier in `SUBJECT-NUMBER` form, e.g. `COMP-3800`.
    pub fn code(&self) -> String {
        format!("{}-{}", self.subject, self.number)
    }
}

/// Run the bulletin pipeline end to end.
///
/// # Returns
///
/// The number of courses written.
///
/// # Errors
///
/// Both a failed page fetch and a failed write abort the run.
#[instrument(level = "info", skip_all, fields(url = %config.url))]
pub async fn run(client: &Client, config: &BulletinConfig, output_dir: &Path) -> Result<usize, Box<dyn Error>> {
    info!("Starting to scrape the bulletin");
    let html = fetch_page(client, &config.url).await?;
    let courses = parse_courses(&html, config);

    let count = courses.len();
    let doc = Bulletin { courses };
    let path = write_json(&doc, output_dir, &config.file_name, JsonStyle::TWO_SPACES_EOL).await?;

    info!(
        count,
        path = %path.display(),
        "Scraped upper-division courses without prerequisites"
    );
    Ok(count)
}

/// Select the qualifying courses from the bulletin page, in page order.
pub fn parse_courses(html: &str, config: &BulletinConfig) -> Vec<CourseRecord> {
    let document = Html::parse_document(html);
    let blocks: Vec<_> = document.select(&COURSE_BLOCK).collect();
    info!(count = blocks.len(), "Found course blocks");

    blocks
        .into_iter()
        .filter_map(|block| {
            let title = select_text(block, &COURSE_TITLE);
            let description = select_text(block, &COURSE_DESC);
            course_from_block(&title, &description, config)
        })
        .inspect(|course| info!(course = %course.course, title = %course.title, "Added course"))
        .collect()
}

/// Decide whether one course block qualifies and build its record.
pub fn course_from_block(title: &str, description: &str, config: &BulletinConfig) -> Option<CourseRecord> {
    let Some(parsed) = parse_course_title(title) else {
        debug!(%title, "Course title does not match the expected grammar");
        return None;
    };

    if !parsed.subject.eq_ignore_ascii_case(&config.subject) {
        debug!(subject = %parsed.subject, "Skipping course from another subject");
        return None;
    }
    if parsed.number < config.min_course_number {
        return None;
    }
    if mentions_prerequisite(description) {
        debug!(course = %parsed.code(), "Skipping course with prerequisites");
        return None;
    }

    Some(CourseRecord {
        course: parsed.code(),
        title: parsed.name,
    })
}

/// Parse a block title such as `COMP 3800. Advanced Topics.`.
///
/// # Examples
///
/// ```ignore
/// let t = parse_course_title("COMP 3351 Programming Languages (4 Credits)").unwrap();
/// assert_eq!(t.code(), "COMP-3351");
/// assert_eq!(t.name, "Programming Languages");
/// ```
pub fn parse_course_title(title: &str) -> Option<CourseTitle> {
    let caps = TITLE_GRAMMAR.captures(title)?;
    let number = caps["number"].parse().ok()?;

    let rest = &caps["rest"];
    let mut end = rest.find('.').unwrap_or(rest.len());
    if let Some(credits) = CREDITS.find(rest) {
        end = end.min(credits.start());
    }

    Some(CourseTitle {
        subject: caps["subject"].to_string(),
        number,
        name: collapse_whitespace(&rest[..end]),
    })
}

/// Whether a description states a prerequisite, in any letter case.
///
/// Explicit negations such as "No prerequisites" are not counted.
pub fn mentions_prerequisite(description: &str) -> bool {
    NO_PREREQUISITES
        .replace_all(description, "")
        .to_lowercase()
        .contains("prerequisite")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, serve_html};

    fn block(title: &str, desc: &str) -> String {
        format!(
            r#"<div class="courseblock"><p class="courseblocktitle"><strong>{}</strong></p><p class="courseblockdesc">{}</p></div>"#,
            title, desc
        )
    }

    fn page(blocks: &[String]) -> String {
        format!("<html><body><div id=\"coursedescriptionstext\">{}</div></body></html>", blocks.concat())
    }

    #[test]
    fn test_upper_division_without_prerequisites() {
        let config = BulletinConfig::default();
        let course = course_from_block("COMP 3800. Advanced Topics.", "No prerequisites.", &config);
        assert_eq!(
            course,
            Some(CourseRecord {
                course: "COMP-3800".into(),
                title: "Advanced Topics".into(),
            })
        );
    }

    #[test]
    fn test_prerequisite_excludes_course() {
        let config = BulletinConfig::default();
        assert!(course_from_block("COMP 3800. Advanced Topics.", "Prerequisite: COMP 2000.", &config).is_none());
        assert!(course_from_block("COMP 3800. Advanced Topics.", "Has PREREQUISITES listed.", &config).is_none());
    }

    #[test]
    fn test_lower_division_never_included() {
        let config = BulletinConfig::default();
        assert!(course_from_block("COMP 1200. Intro.", "Open to all.", &config).is_none());
        assert!(course_from_block("COMP 2999. Almost.", "", &config).is_none());
        assert!(course_from_block("COMP 3000. Exactly.", "", &config).is_some());
    }

    #[test]
    fn test_other_subjects_skipped() {
        let config = BulletinConfig::default();
        assert!(course_from_block("MATH 3100. Proofs.", "Fun.", &config).is_none());
        assert!(course_from_block("comp 3100. Lowercase Subject.", "Fun.", &config).is_some());
    }

    #[test]
    fn test_title_grammar_variants() {
        let t = parse_course_title("COMP 3351 Programming Languages (4 Credits)").unwrap();
        assert_eq!(t.code(), "COMP-3351");
        assert_eq!(t.name, "Programming Languages");

        let t = parse_course_title("COMP 3821  Game   Programming I. More text.").unwrap();
        assert_eq!(t.name, "Game Programming I");

        let t = parse_course_title("\n  COMP 4000. Thesis \n").unwrap();
        assert_eq!(t.name, "Thesis");
    }

    #[test]
    fn test_title_grammar_rejects_malformed() {
        assert!(parse_course_title("Advanced Topics").is_none());
        assert!(parse_course_title("COMP3800 Advanced").is_none());
        assert!(parse_course_title("").is_none());
    }

    #[test]
    fn test_mentions_prerequisite() {
        assert!(mentions_prerequisite("Prerequisite: COMP 2000."));
        assert!(mentions_prerequisite("prerequisites: COMP 1101 and COMP 1201"));
        assert!(!mentions_prerequisite("No prerequisites."));
        assert!(!mentions_prerequisite("Prerequisites: none."));
        assert!(!mentions_prerequisite("Covers advanced topics."));
        assert!(mentions_prerequisite("No prerequisites for majors; others need prerequisite COMP 2000."));
    }

    #[test]
    fn test_parse_courses_keeps_page_order() {
        let html = page(&[
            block("COMP 3200. Second Thing.", "Covers things."),
            block("COMP 1101. Intro.", "Covers basics."),
            block("COMP 3100. First Thing.", "Prerequisite: COMP 1101."),
            block("COMP 4500. Capstone.", "Team project."),
        ]);
        let courses = parse_courses(&html, &BulletinConfig::default());
        let codes: Vec<_> = courses.iter().map(|c| c.course.as_str()).collect();
        assert_eq!(codes, ["COMP-3200", "COMP-4500"]);
    }

    #[test]
    fn test_parse_courses_on_page_without_blocks() {
        assert!(parse_courses("<html><body></body></html>", &BulletinConfig::default()).is_empty());
    }

    #[test]
    fn test_title_without_space_after_period() {
        let t = parse_course_title("COMP 3800.Advanced Topics.").unwrap();
        assert_eq!(t.code(), "COMP-3800");
        assert_eq!(t.name, "Advanced Topics");
    }

    fn sample_page() -> String {
        page(&[
            block("COMP 3800. Advanced Topics.", "No prerequisites."),
            block("COMP 3100. Data.", "Prerequisite: COMP 2000."),
        ])
    }

    #[tokio::test]
    async fn test_run_creates_missing_directory() {
        let url = serve_html(&sample_page()).await;
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("fresh").join("results");
        let config = BulletinConfig {
            url,
            ..BulletinConfig::default()
        };
        let client = crate::fetch::build_client("test").unwrap();

        let count = run(&client, &config, &out).await.unwrap();
        assert_eq!(count, 1);

        let written = std::fs::read_to_string(out.join("bulletin.json")).unwrap();
        assert_eq!(
            written,
            "{\n  \"courses\": [\n    {\n      \"course\": \"COMP-3800\",\n      \"title\": \"Advanced Topics\"\n    }\n  ]\n}\n"
        );
    }

    #[tokio::test]
    async fn test_run_fails_when_write_fails() {
        let url = serve_html(&sample_page()).await;
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("results");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = BulletinConfig {
            url,
            ..BulletinConfig::default()
        };
        let client = crate::fetch::build_client("test").unwrap();

        assert!(run(&client, &config, &blocker).await.is_err());
    }

    #[tokio::test]
    async fn test_run_leaves_no_output_on_fetch_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("results");
        let config = BulletinConfig {
            url: closed_port_url().await,
            ..BulletinConfig::default()
        };
        let client = crate::fetch::build_client("test").unwrap();

        assert!(run(&client, &config, &out).await.is_err());
        assert!(!out.join("bulletin.json").exists());
    }
}
