//! Post header metadata extraction.
//!
//! A level-1 heading carries up to two inline segments:
//! - `(@name)` names a stylesheet and is removed from the title.
//! - `[text]` is a date when it parses as one (in the configured
//!   zone), otherwise a group name; either way it is removed.
//!
//! A heading with no bracket at all defaults to the `drafts` group.
//! Empty segments (`(@)`, `[]`) are ignored and stay in the title.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use regex::Regex;

static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(@(.*?)\)").unwrap());
static RE_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]").unwrap());

/// Date formats accepted inside a `[...]` segment.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y", "%m/%d/%Y"];

/// Metadata extracted from one heading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    /// Heading text with recognized segments removed, trimmed.
    pub title: String,
    pub stylesheet_name: Option<String>,
    pub group: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
}

/// Split a heading into title, stylesheet, and date-or-group.
pub fn parse_header(header: &str, tz: FixedOffset) -> HeaderInfo {
    let mut header = header.to_string();

    let mut stylesheet_name = None;
    if let Some(caps) = RE_STYLE.captures(&header)
        && !caps[1].is_empty()
    {
        stylesheet_name = Some(caps[1].to_string());
        header = RE_STYLE.replace(&header, "").into_owned();
    }

    let mut group = None;
    let mut date = None;
    match RE_BRACKET.captures(&header) {
        Some(caps) if !caps[1].is_empty() => {
            match parse_date(&caps[1], tz) {
                Some(d) => date = Some(d),
                None => group = Some(caps[1].to_string()),
            }
            header = RE_BRACKET.replace(&header, "").into_owned();
        }
        _ => group = Some("drafts".to_string()),
    }

    HeaderInfo {
        title: header.trim().to_string(),
        stylesheet_name,
        group,
        date,
    }
}

/// Parse a bracket segment as a date at midnight in the given zone.
fn parse_date(text: &str, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, format) {
            let midnight = day.and_hms_opt(0, 0, 0)?;
            return tz.from_local_datetime(&midnight).single();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pst() -> FixedOffset {
        FixedOffset::west_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_dated_header() {
        let info = parse_header("My Post [Jan 1, 2024]", pst());
        assert_eq!(info.title, "My Post");
        assert!(info.group.is_none());
        let date = info.date.unwrap();
        assert_eq!(date.format("%Y/%m/%d").to_string(), "2024/01/01");
    }

    #[test]
    fn test_iso_date() {
        let info = parse_header("Release Notes [2023-11-05]", pst());
        assert_eq!(info.title, "Release Notes");
        assert_eq!(
            info.date.unwrap().format("%Y-%m-%d").to_string(),
            "2023-11-05"
        );
    }

    #[test]
    fn test_non_date_bracket_is_group() {
        let info = parse_header("About Me [pages]", pst());
        assert_eq!(info.title, "About Me");
        assert_eq!(info.group.as_deref(), Some("pages"));
        assert!(info.date.is_none());
    }

    #[test]
    fn test_no_bracket_defaults_to_drafts() {
        let info = parse_header("Draft Idea", pst());
        assert_eq!(info.title, "Draft Idea");
        assert_eq!(info.group.as_deref(), Some("drafts"));
        assert!(info.date.is_none());
    }

    #[test]
    fn test_stylesheet_segment_removed() {
        let info = parse_header("Gallery (@photos) [Jan 2, 2024]", pst());
        assert_eq!(info.title, "Gallery");
        assert_eq!(info.stylesheet_name.as_deref(), Some("photos"));
        assert!(info.date.is_some());
    }

    #[test]
    fn test_empty_segments_ignored() {
        // Empty captures behave like no match: drafts default, text kept.
        let info = parse_header("Odd [] Title (@)", pst());
        assert_eq!(info.title, "Odd [] Title (@)");
        assert_eq!(info.group.as_deref(), Some("drafts"));
        assert!(info.stylesheet_name.is_none());
    }

    #[test]
    fn test_first_bracket_wins() {
        let info = parse_header("Lists [notes] and [2024-01-01]", pst());
        assert_eq!(info.group.as_deref(), Some("notes"));
        assert_eq!(info.title, "Lists  and [2024-01-01]");
    }
}
