//! Render-cache invalidation.
//!
//! The engine does not cache rendered output itself; a serving
//! collaborator hands in something implementing [`RenderCache`] and the
//! change notifier clears the keys a modified post can have touched.

use crate::post::Post;

/// Cache of rendered responses keyed by URL-ish strings.
///
/// `remove_all` clears every key under a prefix (paginated listings,
/// query-string variants of a group page, and so on).
pub trait RenderCache: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, body: String);
    fn remove(&self, key: &str);
    fn remove_all(&self, prefix: &str);
}

/// Clear every cached page a modified post may appear on.
///
/// Chronological posts show up on the home page, their permalink, the
/// paginated API listings, and the feed. Grouped posts only touch
/// their group listing; drafts have their own fixed keys.
pub fn invalidate_post(cache: &dyn RenderCache, api_path: &str, post: &Post) {
    if post.is_chronological() {
        cache.remove("/");
        cache.remove(&format!("/{}", post.url));
        cache.remove(&format!("{api_path}/post/{}", post.url));
        cache.remove_all(&format!("{api_path}/page"));
        cache.remove_all(&format!("{api_path}/posts"));
        cache.remove_all("/index.xml");
    } else if post.group.as_deref() == Some("drafts") {
        cache.remove("/drafts");
        cache.remove(&format!("{api_path}/group/drafts"));
    } else {
        cache.remove_all(&post.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::SystemTime;

    /// Records invalidation calls for assertions.
    #[derive(Default)]
    struct RecordingCache {
        removed: Mutex<Vec<String>>,
        removed_prefixes: Mutex<Vec<String>>,
    }

    impl RenderCache for RecordingCache {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }
        fn store(&self, _key: &str, _body: String) {}
        fn remove(&self, key: &str) {
            self.removed.lock().push(key.to_string());
        }
        fn remove_all(&self, prefix: &str) {
            self.removed_prefixes.lock().push(prefix.to_string());
        }
    }

    fn post(url: &str, dated: bool, group: Option<&str>) -> Post {
        let tz = chrono::FixedOffset::west_opt(8 * 3600).unwrap();
        Post {
            title: "T".into(),
            slug: "t".into(),
            path: "a.md".into(),
            mtime: SystemTime::UNIX_EPOCH,
            url: url.into(),
            date: dated.then(|| {
                use chrono::TimeZone;
                tz.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            }),
            group: group.map(str::to_string),
            source: String::new(),
            post_index: 1,
            stylesheet_name: None,
        }
    }

    #[test]
    fn test_chronological_invalidation() {
        let cache = Arc::new(RecordingCache::default());
        invalidate_post(cache.as_ref(), "/api", &post("2024/01/01/t", true, None));

        let removed = cache.removed.lock();
        assert!(removed.contains(&"/".to_string()));
        assert!(removed.contains(&"/2024/01/01/t".to_string()));
        assert!(removed.contains(&"/api/post/2024/01/01/t".to_string()));

        let prefixes = cache.removed_prefixes.lock();
        assert!(prefixes.contains(&"/api/page".to_string()));
        assert!(prefixes.contains(&"/api/posts".to_string()));
        assert!(prefixes.contains(&"/index.xml".to_string()));
    }

    #[test]
    fn test_draft_invalidation() {
        let cache = Arc::new(RecordingCache::default());
        invalidate_post(cache.as_ref(), "/api", &post("drafts", false, Some("drafts")));

        let removed = cache.removed.lock();
        assert_eq!(*removed, vec!["/drafts", "/api/group/drafts"]);
        assert!(cache.removed_prefixes.lock().is_empty());
    }

    #[test]
    fn test_grouped_invalidation() {
        let cache = Arc::new(RecordingCache::default());
        invalidate_post(cache.as_ref(), "/api", &post("pages", false, Some("pages")));

        assert!(cache.removed.lock().is_empty());
        assert_eq!(*cache.removed_prefixes.lock(), vec!["pages"]);
    }
}
