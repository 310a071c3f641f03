//! Content tree monitoring.
//!
//! Watches the directories the content pattern resolves to and turns
//! debounced filesystem events into one invalidate-and-reload cycle.
//! The reconciler re-derives what actually changed from mtimes, so the
//! watcher does not need to interpret individual events.
//!
//! ```text
//! notify → bridge thread → Debouncer (pure timing) → invalidate + reload
//! ```

mod debouncer;

use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::blog::Blog;
use crate::content::content_roots;
use crate::error::ReloadError;
use debouncer::Debouncer;

pub struct ContentWatcher {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    blog: Arc<Blog>,
    debouncer: Debouncer,
}

impl ContentWatcher {
    /// Attach a recursive watch to every content root.
    ///
    /// The watcher starts buffering events immediately, so changes made
    /// while a reload is in flight are not lost.
    pub async fn start(blog: Arc<Blog>) -> Result<Self, ReloadError> {
        // notify delivers on its own threads; bridge through a sync channel.
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .map_err(watch_error)?;

        let roots = content_roots(&blog.config().content_pattern()).await?;
        for root in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(watch_error)?;
            crate::debug!("watch"; "watching {}", root.display());
        }

        Ok(Self {
            notify_rx,
            watcher,
            blog,
            debouncer: Debouncer::new(),
        })
    }

    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let blog = self.blog;
        let mut debouncer = self.debouncer;
        // Dropping the watcher detaches the roots.
        let _watcher = self.watcher;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    debouncer.note(&event);
                }
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if debouncer.take_if_ready().is_none() {
                        continue;
                    }
                    blog.invalidate();
                    if let Err(e) = blog.reload().await {
                        crate::logger::status_error("reload failed", &e.to_string());
                    }
                }
            }
        }
    }
}

fn watch_error(err: notify::Error) -> ReloadError {
    ReloadError::Scan {
        path: Default::default(),
        message: err.to_string(),
    }
}

/// Start monitoring in the background. Failure to attach is reported
/// but does not take the engine down; queries keep working unwatched.
pub fn spawn(blog: Arc<Blog>) {
    tokio::spawn(async move {
        match ContentWatcher::start(blog).await {
            Ok(watcher) => watcher.run().await,
            Err(e) => crate::log!("error"; "could not watch content: {}", e),
        }
    });
}
