//! Post model: one article or page extracted from a content file.

mod header;
mod parser;

pub use header::{HeaderInfo, parse_header};
pub use parser::parse_posts;

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One logical article extracted from a content file at a level-1
/// heading boundary.
///
/// Posts are owned by the in-memory post collection and replaced
/// wholesale on each reconciliation; renderers keep any derived data
/// (body HTML, summaries, icons) in their own structures.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Header text with style/date segments removed.
    pub title: String,
    /// Lowercased, hyphenated, `[a-z0-9-]`-only form of the title.
    pub slug: String,
    /// Source file this post was parsed from.
    pub path: PathBuf,
    /// Modification time of the source file at parse time.
    pub mtime: SystemTime,
    /// `group` verbatim for grouped posts, else `YYYY/MM/DD/slug`.
    pub url: String,
    /// Publication date; absent for drafts and static pages.
    pub date: Option<DateTime<FixedOffset>>,
    /// Non-chronological category label (e.g. `"drafts"`).
    pub group: Option<String>,
    /// Serialized body, used for content equality only.
    pub source: String,
    /// Monotonic parse-order tie-breaker.
    pub post_index: u64,
    /// Stylesheet name extracted from an `(@name)` header segment.
    pub stylesheet_name: Option<String>,
}

impl Post {
    /// Chronological posts carry a date and live under date-based URLs.
    #[inline]
    pub fn is_chronological(&self) -> bool {
        self.date.is_some()
    }

    /// Content equality: equal titles and equal serialized sources.
    /// No other field participates.
    pub fn same_content(&self, other: &Post) -> bool {
        self.title == other.title && self.source == other.source
    }
}

/// Derive a URL slug from a post title.
///
/// Lowercase, whitespace runs become single hyphens, then everything
/// outside `[a-z0-9-]` is stripped.
pub fn slugify(title: &str) -> String {
    let hyphenated = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    hyphenated
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}
