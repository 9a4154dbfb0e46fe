use std::path::{Path, PathBuf};

use storage::StoreError;

/// In-memory view of one catalogued file and its tag set.
///
/// Tags are set-like (no duplicates) but keep insertion order, since the
/// persisted form is an ordered delimited string.
#[derive(Debug, Clone)]
pub struct Record {
    path: PathBuf,
    name: String,
    tags: Vec<String>,
}

impl Record {
    /// Builds the record for `path`, eagerly loading any persisted tags.
    /// A file whose attribute is absent or unreadable starts untagged.
    pub fn load(path: PathBuf) -> Record {
        let name = display_name(&path);
        let tags = storage::load_tags(&path);
        Record { path, name, tags }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Adds `tag` and writes the full set through to storage. Adding a tag
    /// that is already present is a no-op with no write. Returns whether
    /// the set changed.
    ///
    /// On a failed write the in-memory set keeps the new tag; the stored
    /// value catches up on the next successful save or rescan.
    pub fn tag(&mut self, tag: &str) -> Result<bool, StoreError> {
        if self.tags.iter().any(|t| t == tag) {
            return Ok(false);
        }
        self.tags.push(tag.to_string());
        storage::save_tags(&self.path, &self.tags)?;
        Ok(true)
    }

    /// Removes `tag` and writes the full set through to storage. Removing
    /// an absent tag is a silent no-op.
    pub fn untag(&mut self, tag: &str) -> Result<bool, StoreError> {
        let Some(pos) = self.tags.iter().position(|t| t == tag) else {
            return Ok(false);
        };
        self.tags.remove(pos);
        storage::save_tags(&self.path, &self.tags)?;
        Ok(true)
    }

    /// Case-sensitive substring match over the display name. An empty
    /// needle matches every record.
    pub fn matches_name(&self, needle: &str) -> bool {
        self.name.contains(needle)
    }

    /// Subset test: every required tag must be present. An empty
    /// requirement matches every record.
    pub fn matches_tags(&self, required: &[String]) -> bool {
        required.iter().all(|req| self.tags.iter().any(|t| t == req))
    }
}

/// Display name: base name with the final extension removed.
fn display_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_else(|| path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
