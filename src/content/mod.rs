//! Content discovery: pattern expansion and mtime scanning.

mod scan;

pub use scan::{content_roots, scan_content};
