//! Storage layer: per-file tag persistence via extended attributes.
//!
//! Each catalogued file carries its whole tag set in a single attribute
//! value, tags joined by `:` in insertion order. An absent attribute is
//! the same as an empty tag set.

use std::io;
use std::path::{Path, PathBuf};

/// Separator used in the persisted attribute value. Tag names must never
/// contain it.
pub const TAG_DELIMITER: &str = ":";

/// Attribute key holding the tag set. Unprivileged attributes on Linux
/// must live in the `user.` namespace; other platforms take the bare key.
#[cfg(target_os = "linux")]
pub const TAG_ATTR: &str = "user.papercat.tags";
#[cfg(not(target_os = "linux"))]
pub const TAG_ATTR: &str = "papercat.tags";

#[derive(Debug, thiserror::Error)]
#[error("failed to write tags for {}: {}", .path.display(), .source)]
pub struct StoreError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StoreError {
    /// True when the filesystem rejects extended attributes altogether,
    /// as opposed to a per-file failure such as a permission problem.
    pub fn is_unsupported(&self) -> bool {
        self.source.kind() == io::ErrorKind::Unsupported
    }
}

/// Reads the persisted tag set for `path`.
///
/// Absence of the attribute, a filesystem without attribute support, or an
/// unreadable value all normalize to "no tags". Foreign values are cleaned
/// up on the way in: empty segments are dropped and duplicates collapse to
/// their first occurrence.
pub fn load_tags(path: &Path) -> Vec<String> {
    let raw = match xattr::get(path, TAG_ATTR) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "tag attribute unreadable, treating as untagged");
            return Vec::new();
        }
    };
    let value = String::from_utf8_lossy(&raw);
    let mut tags: Vec<String> = Vec::new();
    for tag in value.split(TAG_DELIMITER) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Serializes `tags` and replaces the attribute value entirely.
///
/// The write is synchronous and not retried; on failure the caller's
/// in-memory set and the stored value diverge until the next successful
/// save or rescan.
pub fn save_tags(path: &Path, tags: &[String]) -> Result<(), StoreError> {
    let value = tags.join(TAG_DELIMITER);
    xattr::set(path, TAG_ATTR, value.as_bytes()).map_err(|source| StoreError {
        path: path.to_path_buf(),
        source,
    })
}
