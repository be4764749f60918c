//! Data models for scraped records and the JSON documents that wrap them.
//!
//! This module defines the record types produced by each pipeline:
//! - [`EventRecord`]: one athletics game pulled from the scoreboard payload
//! - [`CourseRecord`]: one upper-division course from the bulletin
//! - [`CalendarEventRecord`]: one event from the university calendar
//!
//! Each output file is a single JSON object with one array field, modeled by
//! [`AthleticEvents`], [`Bulletin`] and [`CalendarEvents`]. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Team name used when the scoreboard payload carries no school name.
pub const DEFAULT_SCHOOL_NAME: &str = "Denver Pioneers";
/// Placeholder for a game whose opponent title is missing.
pub const UNKNOWN_OPPONENT: &str = "Unknown Opponent";
/// Placeholder for a game whose date is missing.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// A single athletics event as listed on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// The home school, e.g. "Denver Pioneers".
    pub du_team: String,
    /// The opposing team's display title.
    pub opponent: String,
    /// The event date exactly as the site publishes it.
    pub date: String,
}

/// An upper-division course with no stated prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseRecord {
    /// Subject and number joined by a hyphen, e.g. `COMP-3800`.
    pub course: String,
    /// The course title without its trailing period.
    pub title: String,
}

/// An event from the calendar listing, merged with its detail-page description.
///
/// `time` and `description` are left out of the JSON entirely when absent,
/// while `fullEventUrl` is written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventRecord {
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub full_event_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document written to `athletic_events.json`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AthleticEvents {
    pub events: Vec<EventRecord>,
}

/// Document written to `bulletin.json`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Bulletin {
    pub courses: Vec<CourseRecord>,
}

/// Document written to `calendar_events.json`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CalendarEvents {
    pub events: Vec<CalendarEventRecord>,
}
