//! Scans one directory level for catalog entries.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::CatalogError;

/// Enumerates the immediate entries of `root`, skipping hidden entries and
/// anything matching an exclude pattern, in filesystem enumeration order.
///
/// A root that does not exist, is unreadable, or is not a directory fails
/// the whole scan; an unreadable child entry is skipped.
pub fn scan(root: &Path, excludes: &[String]) -> Result<Vec<PathBuf>, CatalogError> {
    let meta = fs::metadata(root).map_err(|source| CatalogError::Directory {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(CatalogError::Directory {
            path: root.to_path_buf(),
            source: io::Error::other("not a directory"),
        });
    }

    let exclude_set = build_globset(excludes)?;
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 || err.path() == Some(root) => {
                return Err(CatalogError::Directory {
                    path: root.to_path_buf(),
                    source: err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("unreadable directory")),
                });
            }
            Err(err) => {
                tracing::debug!(%err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if is_hidden(path) || is_excluded(path, &exclude_set) {
            continue;
        }
        entries.push(path.to_path_buf());
    }
    Ok(entries)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, CatalogError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| CatalogError::Pattern {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| CatalogError::Pattern {
        pattern: patterns.join(","),
        source,
    })
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}
