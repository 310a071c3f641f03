//! Watch command implementation.
//!
//! Loads the content tree, keeps it fresh via the filesystem watcher
//! and prints each committed post event until Ctrl+C.

use anyhow::Result;
use tokio::sync::broadcast;

use crate::blog::Blog;
use crate::config::BlogConfig;
use crate::log;
use crate::logger;

/// Execute watch command
pub fn run_watch(mut config: BlogConfig) -> Result<()> {
    config.watch = true;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch(config))
}

async fn watch(config: BlogConfig) -> Result<()> {
    let blog = Blog::new(config);
    // Subscribe before the first load so no committed event is missed.
    let mut events = blog.subscribe();

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    blog.reload().await?;
    let loaded = blog.all_posts().await?.len();
    log!("watch"; "{} dated posts loaded, watching {}", loaded, blog.config().content_pattern());

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                log!("watch"; "shutting down");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    logger::status_success(&format!(
                        "{}: {}",
                        event.kind.label(),
                        event.post.title
                    ));
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    logger::status_warning(&format!("missed {missed} events"));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
