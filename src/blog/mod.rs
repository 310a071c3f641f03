//! The blog engine.
//!
//! [`Blog`] owns the post collection and its derived indexes behind an
//! [`ArcSwap`], so queries read a consistent snapshot without locking
//! while a reload pass builds the replacement off to the side. All
//! queries are lazy: they run a reload first, which returns immediately
//! unless the collection has been invalidated (or never loaded).

mod gate;
mod index;
mod notifier;
mod reconcile;

pub use notifier::{PostEvent, PostEventKind};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use arc_swap::ArcSwap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::sync::broadcast;

use crate::cache::RenderCache;
use crate::config::BlogConfig;
use crate::error::{ReloadError, ReloadResult};
use crate::post::Post;
use crate::transform::{TransformMatch, TransformRegistry, UrlTransform};
use gate::{GateEntry, ReloadGate};
use index::PostIndex;

pub struct Blog {
    config: Arc<BlogConfig>,
    state: ArcSwap<PostIndex>,
    /// Set on construction and by the watcher; cleared after a
    /// successful pass.
    invalid: AtomicBool,
    /// False until the first successful pass.
    loaded: AtomicBool,
    monitoring: AtomicBool,
    /// Parse-order counter shared with every parse task.
    seq: Arc<AtomicU64>,
    gate: ReloadGate,
    notifier: notifier::ChangeNotifier,
    transforms: RwLock<TransformRegistry>,
    scans: AtomicU64,
}

impl Blog {
    pub fn new(config: BlogConfig) -> Arc<Self> {
        Self::with_cache(config, None)
    }

    pub fn with_cache(config: BlogConfig, cache: Option<Arc<dyn RenderCache>>) -> Arc<Self> {
        let notifier = notifier::ChangeNotifier::new(cache, config.api_path.clone());
        Arc::new(Self {
            config: Arc::new(config),
            state: ArcSwap::from_pointee(PostIndex::empty()),
            invalid: AtomicBool::new(true),
            loaded: AtomicBool::new(false),
            monitoring: AtomicBool::new(false),
            seq: Arc::new(AtomicU64::new(0)),
            gate: ReloadGate::new(),
            notifier,
            transforms: RwLock::new(TransformRegistry::new()),
            scans: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &BlogConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Mark the collection stale; the next query or reload rescans.
    pub fn invalidate(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    /// Receive every post event committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<PostEvent> {
        self.notifier.subscribe()
    }

    pub fn add_transform(&self, transform: Arc<dyn UrlTransform>) {
        self.transforms.write().add(transform);
    }

    pub fn match_transform(&self, url: &str) -> Option<TransformMatch> {
        self.transforms.read().match_url(url)
    }

    /// Bring the collection up to date.
    ///
    /// Concurrent callers collapse onto one filesystem pass: the first
    /// caller leads it and everyone else receives the same outcome.
    pub async fn reload(self: &Arc<Self>) -> ReloadResult {
        match self.gate.enter() {
            GateEntry::Leader(guard) => {
                let outcome = self.run_pass().await;
                guard.complete(&outcome);
                outcome
            }
            GateEntry::Waiter(rx) => rx.await.unwrap_or(Err(ReloadError::Aborted)),
        }
    }

    async fn run_pass(self: &Arc<Self>) -> ReloadResult {
        let loaded = self.loaded.load(Ordering::Acquire);
        if loaded && !self.invalid.load(Ordering::Acquire) {
            return Ok(());
        }

        let started = Instant::now();
        self.scans.fetch_add(1, Ordering::Relaxed);

        let previous = loaded.then(|| self.state.load().posts.clone());
        let outcome = reconcile::reconcile(
            &self.config.content_pattern(),
            previous.as_deref(),
            &self.seq,
            self.config.time_zone(),
        )
        .await?;

        let next = PostIndex::rebuild(outcome.posts);
        crate::debug!("reload";
            "{} posts in {}ms",
            next.posts.len(),
            started.elapsed().as_millis()
        );

        self.state.store(Arc::new(next));
        self.invalid.store(false, Ordering::Release);
        self.loaded.store(true, Ordering::Release);
        self.notifier.flush(outcome.events);

        if !loaded && self.config.watch {
            self.start_monitoring();
        }
        Ok(())
    }

    fn start_monitoring(self: &Arc<Self>) {
        if self
            .monitoring
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            crate::watch::spawn(self.clone());
        }
    }

    /// Dated posts, newest first.
    pub async fn all_posts(self: &Arc<Self>) -> Result<Vec<Arc<Post>>, ReloadError> {
        self.reload().await?;
        Ok(self.state.load().dated.clone())
    }

    /// One page of dated posts; pages count from 0.
    pub async fn posts_by_page(
        self: &Arc<Self>,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<Arc<Post>>, ReloadError> {
        self.reload().await?;
        let state = self.state.load();
        let start = page.saturating_mul(per_page);
        Ok(state
            .dated
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    /// Dated posts published on one calendar day, in the engine time
    /// zone.
    pub async fn posts_by_day(
        self: &Arc<Self>,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<Vec<Arc<Post>>, ReloadError> {
        self.reload().await?;
        let key = format!("{year:04}-{month:02}-{day:02}");
        let state = self.state.load();
        Ok(state
            .dated
            .iter()
            .filter(|p| {
                p.date
                    .is_some_and(|d| d.format("%Y-%m-%d").to_string() == key)
            })
            .cloned()
            .collect())
    }

    /// Dated post at an exact date-and-slug URL.
    pub async fn post(
        self: &Arc<Self>,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<Option<Arc<Post>>, ReloadError> {
        self.reload().await?;
        let url = format!("{year:04}/{month:02}/{day:02}/{slug}");
        let state = self.state.load();
        Ok(state.dated.iter().find(|p| p.url == url).cloned())
    }

    /// Find a dated post by slug.
    pub async fn post_by_slug(
        self: &Arc<Self>,
        slug: &str,
    ) -> Result<Option<Arc<Post>>, ReloadError> {
        self.reload().await?;
        let state = self.state.load();
        Ok(state.dated.iter().find(|p| p.slug == slug).cloned())
    }

    /// Posts under one group name, in collection order.
    pub async fn posts_by_group(
        self: &Arc<Self>,
        group: &str,
    ) -> Result<Vec<Arc<Post>>, ReloadError> {
        self.reload().await?;
        let state = self.state.load();
        Ok(state.grouped.get(group).cloned().unwrap_or_default())
    }

    /// Snapshot of every group bucket.
    pub async fn grouped_posts(
        self: &Arc<Self>,
    ) -> Result<FxHashMap<String, Vec<Arc<Post>>>, ReloadError> {
        self.reload().await?;
        Ok(self.state.load().grouped.clone())
    }

    /// Every group name with at least one post.
    pub async fn group_names(self: &Arc<Self>) -> Result<Vec<String>, ReloadError> {
        self.reload().await?;
        let state = self.state.load();
        let mut names: Vec<String> = state.grouped.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    #[cfg(test)]
    fn scan_count(&self) -> u64 {
        self.scans.load(Ordering::Relaxed)
    }
}
