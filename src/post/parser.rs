//! Heading-delimited post extraction from markdown files.
//!
//! Every level-1 heading starts a new post; all source up to the next
//! level-1 heading (or end of file) is that post's body. Content before
//! the first heading belongs to no post and is dropped.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use chrono::FixedOffset;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Post, parse_header, slugify};
use crate::error::ReloadError;

/// Parse a content file into zero or more posts.
///
/// `seq` is the engine-owned parse counter; every post draws the next
/// value so parse order stays recoverable for tie-breaking across
/// invocations.
pub fn parse_posts(
    bytes: &[u8],
    path: &Path,
    mtime: SystemTime,
    seq: &AtomicU64,
    tz: FixedOffset,
) -> Result<Vec<Post>, ReloadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ReloadError::parse(path, e.to_string()))?;

    let mut posts = Vec::new();
    let mut header_text: Option<String> = None;
    // (header, body start offset) of the post currently being built
    let mut current: Option<(String, usize)> = None;

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => {
                if let Some((header, body_start)) = current.take() {
                    posts.push(build_post(
                        &header,
                        &text[body_start..range.start],
                        path,
                        mtime,
                        seq,
                        tz,
                    ));
                }
                header_text = Some(String::new());
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Some(header) = header_text.take() {
                    current = Some((header, range.end));
                }
            }
            Event::Text(t) => {
                if let Some(header) = header_text.as_mut() {
                    header.push_str(&t);
                }
            }
            Event::Code(t) => {
                if let Some(header) = header_text.as_mut() {
                    header.push_str(&t);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(header) = header_text.as_mut() {
                    header.push(' ');
                }
            }
            _ => {}
        }
    }

    if let Some((header, body_start)) = current {
        posts.push(build_post(
            &header,
            &text[body_start..],
            path,
            mtime,
            seq,
            tz,
        ));
    }

    Ok(posts)
}

fn build_post(
    header: &str,
    body: &str,
    path: &Path,
    mtime: SystemTime,
    seq: &AtomicU64,
    tz: FixedOffset,
) -> Post {
    let info = parse_header(header, tz);
    let slug = slugify(&info.title);

    let url = match (&info.group, &info.date) {
        (Some(group), _) => group.clone(),
        (None, Some(date)) => format!("{}/{}", date.format("%Y/%m/%d"), slug),
        (None, None) => slug.clone(),
    };

    Post {
        title: info.title,
        slug,
        path: path.to_path_buf(),
        mtime,
        url,
        date: info.date,
        group: info.group,
        source: body.trim().to_string(),
        post_index: seq.fetch_add(1, Ordering::Relaxed) + 1,
        stylesheet_name: info.stylesheet_name,
    }
}
