use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

pub(super) const DEBOUNCE_MS: u64 = 50;

/// Pure debouncer: timing and path deduplication only. What to do
/// about the changes is the watcher loop's business.
pub(super) struct Debouncer {
    changed: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changed: FxHashSet::default(),
            last_event: None,
        }
    }

    /// Record a notify event. Metadata-only modifications and editor
    /// temp files are dropped; everything else marks its paths dirty.
    pub(super) fn note(&mut self, event: &notify::Event) {
        use notify::EventKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            EventKind::Modify(modify) => {
                // mtime/atime/chmod noise would loop forever: every
                // reload stats the tree it is watching.
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
            }
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            crate::debug!("watch"; "event {:?}: {}", event.kind, path.display());
            self.changed.insert(path.clone());
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the dirty paths once the debounce window has passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashSet<PathBuf>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }
        self.last_event = None;
        let changed = std::mem::take(&mut self.changed);
        (!changed.is_empty()).then_some(changed)
    }

    /// Sleep until the window can next close; effectively forever when
    /// nothing is pending.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
