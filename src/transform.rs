//! URL transform registry.
//!
//! Embed transforms (image hosts, photo services, ...) register a URL
//! pattern; the renderer asks the registry which transform owns a given
//! embed URL. Transforms are tried in registration order and the first
//! match wins. The handlers themselves live with the renderer; the
//! engine only owns the matching.

use std::sync::Arc;

use regex::Regex;

/// One registered embed transform.
pub trait UrlTransform: Send + Sync {
    /// Pattern tested against the URL with its query string removed.
    fn pattern(&self) -> &Regex;
}

/// Result of matching a URL against the registry.
pub struct TransformMatch {
    /// Capture groups of the winning pattern, group 0 excluded.
    pub groups: Vec<Option<String>>,
    /// Decoded query-string pairs from the original URL.
    pub query: Vec<(String, String)>,
    pub transform: Arc<dyn UrlTransform>,
}

/// Ordered transform list; first registered, first tested.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: Vec<Arc<dyn UrlTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, transform: Arc<dyn UrlTransform>) {
        self.transforms.push(transform);
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Find the first transform whose pattern matches `url` (tested
    /// without the query string).
    pub fn match_url(&self, url: &str) -> Option<TransformMatch> {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        let query: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        for transform in &self.transforms {
            if let Some(caps) = transform.pattern().captures(path) {
                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()))
                    .collect();
                return Some(TransformMatch {
                    groups,
                    query,
                    transform: transform.clone(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    struct PhotoTransform;
    static PHOTO_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^https?://photos\.example\.com/([a-z]+)/([0-9]+)$").unwrap());

    impl UrlTransform for PhotoTransform {
        fn pattern(&self) -> &Regex {
            &PHOTO_RE
        }
    }

    struct CatchAllTransform;
    static ANY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").unwrap());

    impl UrlTransform for CatchAllTransform {
        fn pattern(&self) -> &Regex {
            &ANY_RE
        }
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = TransformRegistry::new();
        registry.add(Arc::new(PhotoTransform));
        registry.add(Arc::new(CatchAllTransform));

        let matched = registry
            .match_url("https://photos.example.com/user/12345")
            .unwrap();
        assert_eq!(matched.groups.len(), 2);
        assert_eq!(matched.groups[0].as_deref(), Some("user"));
        assert_eq!(matched.groups[1].as_deref(), Some("12345"));
    }

    #[test]
    fn test_falls_through_to_later_transform() {
        let mut registry = TransformRegistry::new();
        registry.add(Arc::new(PhotoTransform));
        registry.add(Arc::new(CatchAllTransform));

        let matched = registry.match_url("https://other.example.com/x").unwrap();
        assert!(matched.groups.is_empty());
    }

    #[test]
    fn test_query_string_stripped_and_decoded() {
        let mut registry = TransformRegistry::new();
        registry.add(Arc::new(PhotoTransform));

        let matched = registry
            .match_url("https://photos.example.com/user/9?size=large&q=a%20b")
            .unwrap();
        assert_eq!(matched.query.len(), 2);
        assert_eq!(matched.query[0], ("size".into(), "large".into()));
        assert_eq!(matched.query[1], ("q".into(), "a b".into()));
    }

    #[test]
    fn test_no_match() {
        let mut registry = TransformRegistry::new();
        registry.add(Arc::new(PhotoTransform));
        assert!(registry.match_url("ftp://elsewhere").is_none());
    }
}
