//! Glob-style content scanning.
//!
//! Expands the configured content pattern into a flat path → mtime
//! map. Matched directories are re-scanned one level at a time (the
//! directory plus `/*`) until no directories remain, so several
//! top-level directories can contribute to one result map. Any listing
//! or stat failure aborts the scan; the caller aborts the whole
//! reconciliation rather than committing a partial view.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use globset::GlobBuilder;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::ReloadError;

/// Expand `pattern` and stat every non-directory match.
pub async fn scan_content(pattern: &str) -> Result<FxHashMap<PathBuf, SystemTime>, ReloadError> {
    let mut mtimes = FxHashMap::default();
    let mut pending = vec![pattern.to_string()];

    while let Some(pattern) = pending.pop() {
        for path in expand_pattern(&pattern).await? {
            let meta = tokio::fs::symlink_metadata(&path)
                .await
                .map_err(|e| ReloadError::scan(&path, &e))?;
            if meta.is_dir() {
                pending.push(format!("{}/*", path.display()));
            } else {
                let mtime = meta.modified().map_err(|e| ReloadError::scan(&path, &e))?;
                mtimes.insert(path, mtime);
            }
        }
    }

    Ok(mtimes)
}

/// Directories holding the pattern's matches, deduplicated in match
/// order. Matched directories count as roots themselves; matched files
/// contribute their parent directory. Used to pick watch roots.
pub async fn content_roots(pattern: &str) -> Result<Vec<PathBuf>, ReloadError> {
    let mut seen = FxHashSet::default();
    let mut roots = Vec::new();

    for path in expand_pattern(pattern).await? {
        let meta = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| ReloadError::scan(&path, &e))?;
        let root = if meta.is_dir() {
            path
        } else {
            path.parent().map(Path::to_path_buf).unwrap_or(path)
        };
        if seen.insert(root.clone()) {
            roots.push(root);
        }
    }

    Ok(roots)
}

/// Expand one glob pattern into existing paths, component by component.
async fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, ReloadError> {
    let mut roots: Vec<PathBuf> = if pattern.starts_with('/') {
        vec![PathBuf::from("/")]
    } else {
        vec![PathBuf::from(".")]
    };

    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        if has_glob_meta(component) {
            roots = match_component(&roots, component).await?;
        } else {
            let mut next = Vec::with_capacity(roots.len());
            for root in roots {
                let candidate = root.join(component);
                let exists = tokio::fs::try_exists(&candidate)
                    .await
                    .map_err(|e| ReloadError::scan(&candidate, &e))?;
                if exists {
                    next.push(candidate);
                }
            }
            roots = next;
        }
        if roots.is_empty() {
            break;
        }
    }

    Ok(roots)
}

/// List each root and keep entries matching one wildcard component.
/// Hidden entries only match when the component itself starts with a
/// dot.
async fn match_component(roots: &[PathBuf], component: &str) -> Result<Vec<PathBuf>, ReloadError> {
    let matcher = GlobBuilder::new(component)
        .literal_separator(true)
        .build()
        .map_err(|e| ReloadError::Scan {
            path: PathBuf::from(component),
            message: e.to_string(),
        })?
        .compile_matcher();
    let match_hidden = component.starts_with('.');

    let mut matched = Vec::new();
    for root in roots {
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| ReloadError::scan(root, &e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ReloadError::scan(root, &e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') && !match_hidden {
                continue;
            }
            if matcher.is_match(name) {
                matched.push(entry.path());
            }
        }
    }

    matched.sort();
    Ok(matched)
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, body: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[tokio::test]
    async fn test_scan_directory_recurses() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/a.md", "# A");
        write(&dir, "content/nested/b.md", "# B");
        write(&dir, "content/nested/deep/c.md", "# C");

        let pattern = dir.path().join("content").display().to_string();
        let mtimes = scan_content(&pattern).await.unwrap();

        assert_eq!(mtimes.len(), 3);
        assert!(mtimes.contains_key(&dir.path().join("content/nested/deep/c.md")));
    }

    #[tokio::test]
    async fn test_scan_wildcard_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/a.md", "# A");
        write(&dir, "content/notes.txt", "not markdown");

        let pattern = format!("{}/content/*.md", dir.path().display());
        let mtimes = scan_content(&pattern).await.unwrap();

        assert_eq!(mtimes.len(), 1);
        assert!(mtimes.contains_key(&dir.path().join("content/a.md")));
    }

    #[tokio::test]
    async fn test_scan_skips_hidden_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/a.md", "# A");
        write(&dir, "content/.secrets", "hidden");

        let pattern = dir.path().join("content").display().to_string();
        let mtimes = scan_content(&pattern).await.unwrap();

        assert_eq!(mtimes.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_merges_multiple_directories() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/posts/a.md", "# A");
        write(&dir, "content/pages/b.md", "# B");

        let pattern = format!("{}/content/*", dir.path().display());
        let mtimes = scan_content(&pattern).await.unwrap();

        assert_eq!(mtimes.len(), 2);
    }

    #[tokio::test]
    async fn test_scan_missing_pattern_is_empty() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("nope").display().to_string();
        let mtimes = scan_content(&pattern).await.unwrap();
        assert!(mtimes.is_empty());
    }

    #[tokio::test]
    async fn test_content_roots_dedup() {
        let dir = TempDir::new().unwrap();
        write(&dir, "content/a.md", "# A");
        write(&dir, "content/b.md", "# B");
        write(&dir, "content/sub/c.md", "# C");

        let pattern = format!("{}/content/*", dir.path().display());
        let roots = content_roots(&pattern).await.unwrap();

        // a.md and b.md share the content dir; sub/ is its own root.
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&dir.path().join("content")));
        assert!(roots.contains(&dir.path().join("content/sub")));
    }
}
