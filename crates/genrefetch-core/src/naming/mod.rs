//! Artifact naming.
//!
//! Derives the on-disk filename for a fetched candidate from its title,
//! sanitized so concurrent fetches in one collection directory land on
//! distinct, valid paths.

mod sanitize;

use std::path::{Path, PathBuf};

pub use sanitize::{clean_title, MAX_TITLE_CHARS};

/// Stem used when both the title and id sanitize to nothing.
const DEFAULT_STEM: &str = "untitled";

/// Filename stem for a candidate: the cleaned title, falling back to the
/// cleaned id, then to `untitled`.
pub fn artifact_stem(title: &str, id: &str) -> String {
    let stem = clean_title(title);
    if !stem.is_empty() && stem != "." && stem != ".." {
        return stem;
    }
    let id = clean_title(id);
    if id.is_empty() || id == "." || id == ".." {
        DEFAULT_STEM.to_string()
    } else {
        id
    }
}

/// Full artifact path: `<dest>/<stem>.<extension>`.
pub fn artifact_path(dest: &Path, title: &str, id: &str, extension: &str) -> PathBuf {
    dest.join(format!("{}.{}", artifact_stem(title, id), extension))
}
