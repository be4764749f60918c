//! JSON file output for scraped documents.
//!
//! Every pipeline writes a single pretty-printed document into the output
//! directory, replacing any previous file of the same name:
//! ```text
//! results/
//! ├── athletic_events.json
//! ├── bulletin.json
//! └── calendar_events.json
//! ```
//!
//! The indentation of each file is selected with a [`JsonStyle`], so a run
//! against unchanged pages produces byte-identical files.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Layout of a written JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonStyle {
    /// Bytes used for one level of indentation.
    pub indent: &'static [u8],
    /// Whether the file ends with a newline after the closing brace.
    pub trailing_newline: bool,
}

impl JsonStyle {
    pub const TWO_SPACES: JsonStyle = JsonStyle {
        indent: b"  ",
        trailing_newline: false,
    };
    pub const TWO_SPACES_EOL: JsonStyle = JsonStyle {
        indent: b"  ",
        trailing_newline: true,
    };
    pub const FOUR_SPACES: JsonStyle = JsonStyle {
        indent: b"    ",
        trailing_newline: false,
    };
}

/// Serialize `value` with the given style.
pub fn to_pretty_bytes<T: Serialize>(value: &T, style: JsonStyle) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(style.indent);
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    if style.trailing_newline {
        buf.push(b'\n');
    }
    Ok(buf)
}

/// Write `value` to `{dir}/{file_name}`, creating `dir` first if needed.
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
/// The failure is logged before being returned; deciding whether it aborts
/// the run is left to the caller.
#[instrument(level = "info", skip(value, dir, style), fields(dir = %dir.display()))]
pub async fn write_json<T: Serialize>(
    value: &T,
    dir: &Path,
    file_name: &str,
    style: JsonStyle,
) -> Result<PathBuf, Box<dyn Error>> {
    let bytes = to_pretty_bytes(value, style)?;

    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create output directory");
        return Err(e.into());
    }

    let path = dir.join(file_name);
    if let Err(e) = fs::write(&path, &bytes).await {
        error!(path = %path.display(), error = %e, "Failed to write JSON");
        return Err(e.into());
    }

    info!(path = %path.display(), bytes = bytes.len(), "Wrote JSON file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleticEvents, CalendarEventRecord, CalendarEvents, EventRecord};

    fn sample_events() -> AthleticEvents {
        AthleticEvents {
            events: vec![EventRecord {
                du_team: "Denver Pioneers".into(),
                opponent: "Air Force".into(),
                date: "2025-04-01".into(),
            }],
        }
    }

    #[test]
    fn test_two_space_layout() {
        let bytes = to_pretty_bytes(&sample_events(), JsonStyle::TWO_SPACES).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"events\": [\n    {\n      \"duTeam\""));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_four_space_layout() {
        let doc = CalendarEvents {
            events: vec![CalendarEventRecord {
                title: "Concert".into(),
                date: "May 2".into(),
                time: None,
                full_event_url: None,
                description: None,
            }],
        };
        let text = String::from_utf8(to_pretty_bytes(&doc, JsonStyle::FOUR_SPACES).unwrap()).unwrap();
        let expected = concat!(
            "{\n",
            "    \"events\": [\n",
            "        {\n",
            "            \"title\": \"Concert\",\n",
            "            \"date\": \"May 2\",\n",
            "            \"fullEventUrl\": null\n",
            "        }\n",
            "    ]\n",
            "}"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_trailing_newline() {
        let text = String::from_utf8(to_pretty_bytes(&sample_events(), JsonStyle::TWO_SPACES_EOL).unwrap()).unwrap();
        assert!(text.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_write_json_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("results");
        assert!(!dir.exists());

        let path = write_json(&sample_events(), &dir, "athletic_events.json", JsonStyle::TWO_SPACES)
            .await
            .unwrap();

        assert_eq!(path, dir.join("athletic_events.json"));
        let written: AthleticEvents = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.events, sample_events().events);
    }

    #[tokio::test]
    async fn test_write_json_overwrites_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("athletic_events.json");
        std::fs::write(&path, "stale contents that are longer than the new document ........").unwrap();

        write_json(&sample_events(), tmp.path(), "athletic_events.json", JsonStyle::TWO_SPACES)
            .await
            .unwrap();
        let first = std::fs::read(&path).unwrap();
        write_json(&sample_events(), tmp.path(), "athletic_events.json", JsonStyle::TWO_SPACES)
            .await
            .unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert!(!String::from_utf8(first).unwrap().contains("stale"));
    }

    #[tokio::test]
    async fn test_write_json_reports_unwritable_target() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("results");
        std::fs::write(&blocker, "not a directory").unwrap();

        let res = write_json(&sample_events(), &blocker, "athletic_events.json", JsonStyle::TWO_SPACES).await;
        assert!(res.is_err());
    }
}
