//! The catalog index: ordered records plus query and bulk-mutation ops.
//!
//! Positions are 0-based, assigned in filesystem enumeration order at build
//! time, and valid only until the next build.

use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::models::Record;
use crate::scanner;

/// Filter over catalog records, parsed from one `list`-style argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Every record.
    All,
    /// Records whose tag set contains all of these.
    Tags(Vec<String>),
    /// Records whose name contains this substring.
    Name(String),
}

impl Criterion {
    /// Parses a listing criterion.
    ///
    /// Empty input selects everything. `[t1,t2,...]` with no embedded
    /// spaces selects by required tags. Any other space-free string selects
    /// by name substring. Everything else is malformed.
    pub fn parse(arg: &str) -> Result<Criterion, CatalogError> {
        if arg.is_empty() {
            return Ok(Criterion::All);
        }
        if arg.starts_with('[') && arg.ends_with(']') && !arg.contains(' ') {
            let inner = &arg[1..arg.len() - 1];
            let tags = inner.split(',').map(str::to_string).collect();
            return Ok(Criterion::Tags(tags));
        }
        if !arg.contains(' ') {
            return Ok(Criterion::Name(arg.to_string()));
        }
        Err(CatalogError::Criterion {
            arg: arg.to_string(),
        })
    }
}

/// The closed set of bulk mutations the index applies to matching records.
#[derive(Debug, Clone)]
pub enum Mutation {
    Tag(String),
    Untag(String),
}

impl Mutation {
    pub fn tag(name: &str) -> Result<Mutation, CatalogError> {
        validate_tag(name)?;
        Ok(Mutation::Tag(name.to_string()))
    }

    pub fn untag(name: &str) -> Result<Mutation, CatalogError> {
        validate_tag(name)?;
        Ok(Mutation::Untag(name.to_string()))
    }

    fn apply(&self, record: &mut Record) -> Result<bool, storage::StoreError> {
        match self {
            Mutation::Tag(name) => record.tag(name),
            Mutation::Untag(name) => record.untag(name),
        }
    }
}

/// Tag names must survive the colon-delimited wire format.
pub fn validate_tag(tag: &str) -> Result<(), CatalogError> {
    if tag.is_empty() || tag.contains(storage::TAG_DELIMITER) {
        return Err(CatalogError::Tag {
            tag: tag.to_string(),
        });
    }
    Ok(())
}

/// Ordered collection of records for one directory scan.
#[derive(Debug)]
pub struct Index {
    root: PathBuf,
    records: Vec<Record>,
}

impl Index {
    /// Scans the immediate entries of `root` and builds one record per
    /// visible entry, preserving filesystem enumeration order. Each record
    /// eagerly loads its persisted tags.
    pub fn build(root: &Path, excludes: &[String]) -> Result<Index, CatalogError> {
        let paths = scanner::scan(root, excludes)?;
        let records: Vec<Record> = paths.into_iter().map(Record::load).collect();
        tracing::debug!(root = %root.display(), count = records.len(), "catalog built");
        Ok(Index {
            root: root.to_path_buf(),
            records,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// The record at `position`, for read-only hand-offs such as the
    /// external viewer.
    pub fn record_at(&self, position: usize) -> Result<&Record, CatalogError> {
        self.records.get(position).ok_or(CatalogError::Position {
            position,
            count: self.records.len(),
        })
    }

    /// Records matching `criterion`, paired with their positions, in build
    /// order.
    pub fn list(&self, criterion: &Criterion) -> Vec<(usize, &Record)> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| match criterion {
                Criterion::All => true,
                Criterion::Tags(required) => r.matches_tags(required),
                Criterion::Name(needle) => r.matches_name(needle),
            })
            .collect()
    }

    /// Applies `mutation` to every record whose name contains `needle`.
    /// Returns how many records actually changed.
    ///
    /// The sweep is sequential and not atomic: a failed write stops it,
    /// leaving earlier matches mutated and later ones untouched.
    pub fn apply_by_name(
        &mut self,
        mutation: &Mutation,
        needle: &str,
    ) -> Result<usize, CatalogError> {
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| r.matches_name(needle)) {
            if mutation.apply(record)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Applies `mutation` to every record whose tag set contains all of
    /// `required`. Same sweep semantics as [`Index::apply_by_name`].
    pub fn apply_by_tags(
        &mut self,
        mutation: &Mutation,
        required: &[String],
    ) -> Result<usize, CatalogError> {
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| r.matches_tags(required)) {
            if mutation.apply(record)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Tags every record, persisting each change like any other mutation.
    pub fn tag_all(&mut self, tag: &str) -> Result<usize, CatalogError> {
        let mutation = Mutation::tag(tag)?;
        let mut changed = 0;
        for record in self.records.iter_mut() {
            if mutation.apply(record)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Tags exactly the record at `position`. Returns whether the tag set
    /// changed.
    pub fn tag_at(&mut self, position: usize, tag: &str) -> Result<bool, CatalogError> {
        validate_tag(tag)?;
        let count = self.records.len();
        let record = self
            .records
            .get_mut(position)
            .ok_or(CatalogError::Position { position, count })?;
        Ok(record.tag(tag)?)
    }

    /// Untags exactly the record at `position`.
    pub fn untag_at(&mut self, position: usize, tag: &str) -> Result<bool, CatalogError> {
        validate_tag(tag)?;
        let count = self.records.len();
        let record = self
            .records
            .get_mut(position)
            .ok_or(CatalogError::Position { position, count })?;
        Ok(record.untag(tag)?)
    }

    /// Union of all tag sets: flattened, sorted lexicographically, then
    /// deduplicated in place so the sorted order is what survives.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .records
            .iter()
            .flat_map(|r| r.tags().iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}
