//! Derived views over the authoritative post collection.
//!
//! Rebuilt wholesale from the post collection after every successful
//! reconciliation, never patched incrementally, so the views can never
//! drift from the collection they were derived from.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::post::Post;

/// The post collection plus its derived views, swapped in atomically
/// as one unit.
#[derive(Debug, Default)]
pub struct PostIndex {
    /// Authoritative ordered sequence of all posts.
    pub posts: Vec<Arc<Post>>,
    /// Dated posts, newest first; equal dates keep parse order.
    pub dated: Vec<Arc<Post>>,
    /// Group name → posts in collection order. Ungrouped posts are
    /// absent; duplicate group names aggregate into one bucket.
    pub grouped: FxHashMap<String, Vec<Arc<Post>>>,
}

impl PostIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recompute both views from a finalized collection.
    pub fn rebuild(posts: Vec<Arc<Post>>) -> Self {
        let mut dated: Vec<Arc<Post>> = posts.iter().filter(|p| p.date.is_some()).cloned().collect();
        dated.sort_by(|a, b| b.date.cmp(&a.date).then(a.post_index.cmp(&b.post_index)));

        let mut grouped: FxHashMap<String, Vec<Arc<Post>>> = FxHashMap::default();
        for post in &posts {
            if let Some(group) = &post.group {
                grouped.entry(group.clone()).or_default().push(post.clone());
            }
        }

        Self {
            posts,
            dated,
            grouped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use std::time::SystemTime;

    fn make_post(title: &str, date: Option<(i32, u32, u32)>, group: Option<&str>, index: u64) -> Arc<Post> {
        let tz = FixedOffset::west_opt(8 * 3600).unwrap();
        let date = date.map(|(y, m, d)| tz.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap());
        Arc::new(Post {
            title: title.to_string(),
            slug: crate::post::slugify(title),
            path: "test.md".into(),
            mtime: SystemTime::UNIX_EPOCH,
            url: group.map(str::to_string).unwrap_or_else(|| title.to_lowercase()),
            date,
            group: group.map(str::to_string),
            source: String::new(),
            post_index: index,
            stylesheet_name: None,
        })
    }

    #[test]
    fn test_dated_newest_first() {
        let index = PostIndex::rebuild(vec![
            make_post("Old", Some((2023, 5, 1)), None, 1),
            make_post("New", Some((2024, 2, 1)), None, 2),
            make_post("Mid", Some((2023, 12, 1)), None, 3),
        ]);
        let titles: Vec<_> = index.dated.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["New", "Mid", "Old"]);
    }

    #[test]
    fn test_equal_dates_tie_break_by_parse_order() {
        let index = PostIndex::rebuild(vec![
            make_post("Second Parsed", Some((2024, 1, 1)), None, 8),
            make_post("First Parsed", Some((2024, 1, 1)), None, 3),
        ]);
        let titles: Vec<_> = index.dated.iter().map(|p| p.title.as_str()).collect();
        // Smaller post_index sorts first among same-date posts.
        assert_eq!(titles, ["First Parsed", "Second Parsed"]);
    }

    #[test]
    fn test_undated_excluded_from_dated() {
        let index = PostIndex::rebuild(vec![
            make_post("Draft", None, Some("drafts"), 1),
            make_post("Dated", Some((2024, 1, 1)), None, 2),
        ]);
        assert_eq!(index.dated.len(), 1);
        assert_eq!(index.posts.len(), 2);
    }

    #[test]
    fn test_grouped_preserves_collection_order() {
        let index = PostIndex::rebuild(vec![
            make_post("A", None, Some("drafts"), 1),
            make_post("B", None, Some("pages"), 2),
            make_post("C", None, Some("drafts"), 3),
        ]);
        let drafts: Vec<_> = index.grouped["drafts"].iter().map(|p| p.title.as_str()).collect();
        assert_eq!(drafts, ["A", "C"]);
        assert_eq!(index.grouped["pages"].len(), 1);
    }

    #[test]
    fn test_ungrouped_absent_from_groups() {
        let index = PostIndex::rebuild(vec![make_post("Dated", Some((2024, 1, 1)), None, 1)]);
        assert!(index.grouped.is_empty());
    }
}
