//! Reload error taxonomy.
//!
//! Any error during a reconciliation pass aborts that entire pass: the
//! previous post collection and its derived indexes stay untouched and
//! keep serving queries. Errors are `Clone` because a single pass
//! outcome fans out to every caller queued on the reload gate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by a reconciliation pass.
#[derive(Debug, Clone, Error)]
pub enum ReloadError {
    /// Directory listing or stat failed while expanding the content pattern.
    #[error("content scan failed at `{path}`: {message}")]
    Scan { path: PathBuf, message: String },

    /// A content file could not be read.
    #[error("failed to read `{path}`: {message}")]
    Io { path: PathBuf, message: String },

    /// A content file could not be tokenized.
    #[error("could not parse `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    /// The in-flight pass went away without delivering an outcome.
    #[error("reload pass aborted before completion")]
    Aborted,
}

impl ReloadError {
    pub fn scan(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Scan {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Outcome shared between the leading reload caller and everyone who
/// queued behind it.
pub type ReloadResult = Result<(), ReloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = ReloadError::parse("content/2024-01-01.md", "invalid UTF-8");
        let display = format!("{err}");
        assert!(display.contains("2024-01-01.md"));
        assert!(display.contains("invalid UTF-8"));
    }

    #[test]
    fn test_clone_preserves_variant() {
        let err = ReloadError::Aborted;
        assert!(matches!(err.clone(), ReloadError::Aborted));
    }
}
