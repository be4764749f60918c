//! Site scrapers, one pipeline per module.
//!
//! Each pipeline runs fetch → extract → transform → write once per
//! invocation and shares nothing with the others.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Output |
//! |--------|--------|--------|--------|
//! | Pioneers athletics | [`athletics`] | JSON embedded in a scoreboard `<script>` | `athletic_events.json` |
//! | DU bulletin | [`bulletin`] | HTML course blocks | `bulletin.json` |
//! | DU calendar | [`calendar`] | HTML listing + per-event detail pages | `calendar_events.json` |
//!
//! # Failure Policy
//!
//! | Pipeline | Page fetch fails | Nothing matches | Write fails |
//! |----------|------------------|-----------------|-------------|
//! | athletics | run aborts | empty file | logged |
//! | bulletin | run aborts | empty file | run aborts |
//! | calendar | empty file | empty file | logged |

use scraper::{ElementRef, Selector};

pub mod athletics;
pub mod bulletin;
pub mod calendar;

/// Concatenated text of every descendant of `element` matching `selector`, trimmed.
///
/// Returns an empty string when nothing matches.
pub(crate) fn select_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Trimmed text of an element, including all of its descendants.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
