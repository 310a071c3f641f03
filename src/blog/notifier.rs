//! Post change events.
//!
//! Created/changed/deleted events accumulate during a reconciliation
//! pass and are flushed here after the new collection has been
//! committed, each one followed by the render-cache invalidation hook.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::cache::{RenderCache, invalidate_post};
use crate::post::Post;

/// Event buffer before a subscriber starts lagging.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostEventKind {
    Created,
    Changed,
    Deleted,
}

impl PostEventKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Deleted => "deleted",
        }
    }
}

/// One committed change to the post collection.
#[derive(Debug, Clone)]
pub struct PostEvent {
    pub kind: PostEventKind,
    pub post: Arc<Post>,
}

impl PostEvent {
    pub fn created(post: Arc<Post>) -> Self {
        Self {
            kind: PostEventKind::Created,
            post,
        }
    }

    pub fn changed(post: Arc<Post>) -> Self {
        Self {
            kind: PostEventKind::Changed,
            post,
        }
    }

    pub fn deleted(post: Arc<Post>) -> Self {
        Self {
            kind: PostEventKind::Deleted,
            post,
        }
    }
}

/// Fans committed events out to subscribers and the render cache.
pub struct ChangeNotifier {
    tx: broadcast::Sender<PostEvent>,
    cache: Option<Arc<dyn RenderCache>>,
    api_path: String,
}

impl ChangeNotifier {
    pub fn new(cache: Option<Arc<dyn RenderCache>>, api_path: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tx,
            cache,
            api_path: api_path.into(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostEvent> {
        self.tx.subscribe()
    }

    /// Emit events in accumulation order, then run the per-post cache
    /// hook for each one.
    pub fn flush(&self, events: Vec<PostEvent>) {
        for event in events {
            crate::debug!("reload"; "post {}: {}", event.kind.label(), event.post.title);
            // No subscribers is not an error.
            let _ = self.tx.send(event.clone());
            if let Some(cache) = &self.cache {
                invalidate_post(cache.as_ref(), &self.api_path, &event.post);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn draft(title: &str) -> Arc<Post> {
        Arc::new(Post {
            title: title.to_string(),
            slug: crate::post::slugify(title),
            path: "a.md".into(),
            mtime: SystemTime::UNIX_EPOCH,
            url: "drafts".into(),
            date: None,
            group: Some("drafts".into()),
            source: String::new(),
            post_index: 1,
            stylesheet_name: None,
        })
    }

    #[tokio::test]
    async fn test_flush_preserves_order() {
        let notifier = ChangeNotifier::new(None, "/api");
        let mut rx = notifier.subscribe();

        notifier.flush(vec![
            PostEvent::created(draft("one")),
            PostEvent::deleted(draft("two")),
        ]);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, PostEventKind::Created);
        assert_eq!(first.post.title, "one");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, PostEventKind::Deleted);
    }

    #[tokio::test]
    async fn test_flush_without_subscribers_is_fine() {
        let notifier = ChangeNotifier::new(None, "/api");
        notifier.flush(vec![PostEvent::changed(draft("quiet"))]);
    }
}
