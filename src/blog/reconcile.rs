//! The scan-diff-commit pass.
//!
//! Compares the previous post collection against a fresh filesystem
//! scan and produces the next collection plus the minimal set of
//! created/changed/deleted events. Per-file work (read + parse) fans
//! out as spawned tasks; results are joined in path order before
//! anything is committed, so a failing file aborts the whole pass with
//! the previous state untouched.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::SystemTime;

use chrono::FixedOffset;
use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;

use super::notifier::PostEvent;
use crate::content::scan_content;
use crate::error::ReloadError;
use crate::post::{Post, parse_posts};

/// Result of one successful pass: the next authoritative collection
/// and the events to flush after commit.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub posts: Vec<Arc<Post>>,
    pub events: Vec<PostEvent>,
}

/// Posts and events contributed by a single file.
struct FileOutcome {
    posts: Vec<Arc<Post>>,
    events: Vec<PostEvent>,
}

/// Per-file decision: reuse the previous parse or wait on a fresh one.
enum FileJob {
    /// Mtime unchanged; previous posts carry over verbatim.
    Carried(Vec<Arc<Post>>),
    Parse(JoinHandle<Result<FileOutcome, ReloadError>>),
}

/// Run one reconciliation pass.
///
/// `previous` is `None` on the very first load, which populates the
/// collection without emitting any events.
pub async fn reconcile(
    pattern: &str,
    previous: Option<&[Arc<Post>]>,
    seq: &Arc<AtomicU64>,
    tz: FixedOffset,
) -> Result<ReconcileOutcome, ReloadError> {
    let scanned = scan_content(pattern).await?;
    let first_load = previous.is_none();

    // One file may yield several posts; bucket the previous collection
    // by source path. Paths left in here at the end are deletions.
    let mut prev_by_path: FxHashMap<PathBuf, Vec<Arc<Post>>> = FxHashMap::default();
    for post in previous.unwrap_or_default() {
        prev_by_path
            .entry(post.path.clone())
            .or_default()
            .push(post.clone());
    }

    // Deterministic order: events and the new collection follow sorted
    // paths, not task completion order.
    let mut scanned: Vec<(PathBuf, SystemTime)> = scanned.into_iter().collect();
    scanned.sort_by(|a, b| a.0.cmp(&b.0));

    let mut jobs = Vec::with_capacity(scanned.len());
    for (path, mtime) in scanned {
        let job = match prev_by_path.remove(&path) {
            None => FileJob::Parse(spawn_parse_new(path, mtime, seq.clone(), tz, !first_load)),
            Some(prev_posts) => {
                if mtime > prev_posts[0].mtime {
                    FileJob::Parse(spawn_reparse(path, mtime, prev_posts, seq.clone(), tz))
                } else {
                    FileJob::Carried(prev_posts)
                }
            }
        };
        jobs.push(job);
    }

    // Gather barrier: every per-file decision resolves before commit.
    let mut posts = Vec::new();
    let mut events = Vec::new();
    for job in jobs {
        match job {
            FileJob::Carried(carried) => posts.extend(carried),
            FileJob::Parse(handle) => {
                let outcome = handle.await.map_err(|_| ReloadError::Aborted)??;
                posts.extend(outcome.posts);
                events.extend(outcome.events);
            }
        }
    }

    // Files gone from the scan: every post they held is deleted.
    let mut removed: Vec<(PathBuf, Vec<Arc<Post>>)> = prev_by_path.into_iter().collect();
    removed.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, old_posts) in removed {
        events.extend(old_posts.into_iter().map(PostEvent::deleted));
    }

    Ok(ReconcileOutcome { posts, events })
}

/// Parse a file not seen before. Every post it yields is a creation,
/// suppressed during initial population.
fn spawn_parse_new(
    path: PathBuf,
    mtime: SystemTime,
    seq: Arc<AtomicU64>,
    tz: FixedOffset,
    emit_created: bool,
) -> JoinHandle<Result<FileOutcome, ReloadError>> {
    tokio::spawn(async move {
        let posts = read_and_parse(&path, mtime, &seq, tz).await?;
        let events = if emit_created {
            posts.iter().cloned().map(PostEvent::created).collect()
        } else {
            Vec::new()
        };
        Ok(FileOutcome { posts, events })
    })
}

/// Reparse a modified file and diff its posts against the previous
/// parse. New posts are matched to previous ones by URL, first match
/// wins; a matched post only counts as changed when title or source
/// differ. Previous posts no one matched are deletions.
fn spawn_reparse(
    path: PathBuf,
    mtime: SystemTime,
    prev_posts: Vec<Arc<Post>>,
    seq: Arc<AtomicU64>,
    tz: FixedOffset,
) -> JoinHandle<Result<FileOutcome, ReloadError>> {
    tokio::spawn(async move {
        let posts = read_and_parse(&path, mtime, &seq, tz).await?;

        let mut pending_deletion = prev_posts;
        let mut events = Vec::new();
        for post in &posts {
            match pending_deletion.iter().position(|old| old.url == post.url) {
                Some(at) => {
                    let old = pending_deletion.remove(at);
                    if !post.same_content(&old) {
                        events.push(PostEvent::changed(post.clone()));
                    }
                }
                None => events.push(PostEvent::created(post.clone())),
            }
        }
        events.extend(pending_deletion.into_iter().map(PostEvent::deleted));

        Ok(FileOutcome { posts, events })
    })
}

async fn read_and_parse(
    path: &PathBuf,
    mtime: SystemTime,
    seq: &AtomicU64,
    tz: FixedOffset,
) -> Result<Vec<Arc<Post>>, ReloadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ReloadError::io(path, &e))?;
    let posts = parse_posts(&bytes, path, mtime, seq, tz)?;
    Ok(posts.into_iter().map(Arc::new).collect())
}
