use std::io;
use std::path::PathBuf;

use storage::StoreError;

/// Errors surfaced by catalog operations.
///
/// Only `Directory` aborts the operation that raised it entirely; the
/// usage-class variants are reported at the command boundary together with
/// the command's help text, and `Persist` marks an accepted divergence
/// between memory and storage rather than a corrupted catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read catalog directory {}: {}", .path.display(), .source)]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("malformed criterion `{arg}`")]
    Criterion { arg: String },

    #[error("position {position} is out of range, the catalog holds {count} entries")]
    Position { position: usize, count: usize },

    #[error("invalid tag `{}`: tags are non-empty and never contain `{}`", .tag, storage::TAG_DELIMITER)]
    Tag { tag: String },

    #[error(transparent)]
    Persist(#[from] StoreError),
}

impl CatalogError {
    /// Usage-class errors come from malformed command input; the shell
    /// reports them with a usage hint and keeps running.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            CatalogError::Criterion { .. }
                | CatalogError::Position { .. }
                | CatalogError::Tag { .. }
        )
    }
}
