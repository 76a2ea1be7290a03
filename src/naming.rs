//! Centralized path and slug conventions.
//!
//! Every route path goes through the same small set of rules, whether it was
//! registered directly or produced by a route-set expansion:
//!
//! - A leading `/` is stripped: `/about` and `about` name the same route.
//! - A path whose last segment carries an extension is a **terminal file**
//!   written verbatim (`feed.xml`, `404.html`).
//! - Anything else is a **directory route** and gets `index.html` appended
//!   (`post/first` → `post/first/index.html`). A trailing `/` always means
//!   directory route.
//!
//! ## Slugs
//!
//! Route-set templates contain the `{s}` placeholder. Before substitution the
//! slug loses a trailing extension, so a filename-like slug never turns a
//! directory route into a terminal file by accident:
//! - `report.json` → `report`
//! - `first` → `first`
//! - `v1.2` → `v1`

use std::path::{Path, PathBuf};

/// Placeholder substituted with the slug in route-set path and title templates.
pub const PLACEHOLDER: &str = "{s}";

/// Filename appended to directory routes.
pub const INDEX_FILE: &str = "index.html";

/// Strip leading separators and `.` segments from a route path.
///
/// Repeated separators collapse; a trailing `/` is kept.
pub fn normalize_path(path: &str) -> String {
    let mut out = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    if path.ends_with('/') && !out.is_empty() {
        out.push('/');
    }
    out
}

/// Whether a normalized route path names a file rather than a directory.
pub fn is_terminal_file(path: &str) -> bool {
    if path.is_empty() || path.ends_with('/') {
        return false;
    }
    let last = path.rsplit('/').next().unwrap_or(path);
    Path::new(last).extension().is_some()
}

/// The file a normalized route path is written to, relative to the output root.
///
/// ```text
/// ""            → index.html
/// "post/first"  → post/first/index.html
/// "feed.xml"    → feed.xml
/// ```
pub fn output_file(path: &str) -> PathBuf {
    if is_terminal_file(path) {
        PathBuf::from(path)
    } else {
        Path::new(path.trim_end_matches('/')).join(INDEX_FILE)
    }
}

/// Remove a trailing file extension from a slug, if it has one.
pub fn strip_extension(slug: &str) -> &str {
    let Some(ext) = Path::new(slug).extension().and_then(|e| e.to_str()) else {
        return slug;
    };
    slug.strip_suffix(ext)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(slug)
}

/// Whether a template contains the slug placeholder.
pub fn has_placeholder(template: &str) -> bool {
    template.contains(PLACEHOLDER)
}

/// Replace every placeholder in `template` with `slug`. Literal replacement.
pub fn substitute(template: &str, slug: &str) -> String {
    template.replace(PLACEHOLDER, slug)
}
