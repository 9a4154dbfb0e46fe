use papercat_core::error::CatalogError;
use papercat_core::index::{Criterion, Index, Mutation};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"content").unwrap();
}

/// The temp filesystem may lack extended-attribute support; tests that
/// persist tags bail out instead of failing there.
fn xattr_supported(dir: &Path) -> bool {
    let probe = dir.join("xattr_probe");
    fs::write(&probe, b"x").unwrap();
    let ok = match storage::save_tags(&probe, &["probe".to_string()]) {
        Ok(()) => true,
        Err(err) if err.is_unsupported() => false,
        Err(err) => panic!("probe save failed: {err}"),
    };
    fs::remove_file(&probe).unwrap();
    ok
}

fn position_of(index: &Index, name: &str) -> usize {
    index
        .list(&Criterion::All)
        .iter()
        .find(|(_, r)| r.name() == name)
        .map(|(pos, _)| *pos)
        .unwrap_or_else(|| panic!("no record named {name}"))
}

fn tags_of(index: &Index, name: &str) -> Vec<String> {
    let pos = position_of(index, name);
    index.record_at(pos).unwrap().tags().to_vec()
}

#[test]
fn build_fails_on_missing_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        Index::build(&missing, &[]),
        Err(CatalogError::Directory { .. })
    ));
}

#[test]
fn build_fails_on_file_root() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "file.pdf");
    assert!(matches!(
        Index::build(&dir.path().join("file.pdf"), &[]),
        Err(CatalogError::Directory { .. })
    ));
}

#[test]
fn hidden_entries_are_excluded() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "visible.pdf");
    touch(dir.path(), ".hidden.pdf");
    let index = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.record_at(0).unwrap().name(), "visible");
}

#[test]
fn exclude_globs_are_honored() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "keep.pdf");
    touch(dir.path(), "noise.log");
    let index = Index::build(dir.path(), &["*.log".to_string()]).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.record_at(0).unwrap().name(), "keep");
}

#[test]
fn untagged_files_build_with_empty_tags() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    let index = Index::build(dir.path(), &[]).unwrap();
    assert!(index.record_at(0).unwrap().tags().is_empty());
}

#[test]
fn list_by_tag_subset_and_by_name() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    storage::save_tags(&dir.path().join("b.pdf"), &["x".to_string()]).unwrap();

    let index = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(index.list(&Criterion::All).len(), 2);

    let tagged = index.list(&Criterion::parse("[x]").unwrap());
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].1.name(), "b");

    let named = index.list(&Criterion::parse("a").unwrap());
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].1.name(), "a");
}

#[test]
fn tags_survive_a_rebuild() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    let mut index = Index::build(dir.path(), &[]).unwrap();
    assert!(index.tag_at(0, "foo").unwrap());

    let rebuilt = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(tags_of(&rebuilt, "a"), vec!["foo".to_string()]);
}

#[test]
fn tagging_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    let mut index = Index::build(dir.path(), &[]).unwrap();
    assert!(index.tag_at(0, "foo").unwrap());
    assert!(!index.tag_at(0, "foo").unwrap());
    assert_eq!(index.record_at(0).unwrap().tags(), ["foo".to_string()]);
}

#[test]
fn untagging_an_absent_tag_is_a_noop() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    let mut index = Index::build(dir.path(), &[]).unwrap();
    assert!(!index.untag_at(0, "ghost").unwrap());
    assert!(index.record_at(0).unwrap().tags().is_empty());
}

#[test]
fn apply_by_name_only_touches_matches() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "report_q1.pdf");
    touch(dir.path(), "report_q2.pdf");
    touch(dir.path(), "summary.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    let mut index = Index::build(dir.path(), &[]).unwrap();
    let mutation = Mutation::tag("draft").unwrap();
    let changed = index.apply_by_name(&mutation, "report").unwrap();
    assert_eq!(changed, 2);
    assert_eq!(tags_of(&index, "report_q1"), vec!["draft".to_string()]);
    assert_eq!(tags_of(&index, "report_q2"), vec!["draft".to_string()]);
    assert!(tags_of(&index, "summary").is_empty());
}

#[test]
fn apply_by_tags_requires_the_whole_subset() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    storage::save_tags(
        &dir.path().join("a.pdf"),
        &["x".to_string(), "y".to_string()],
    )
    .unwrap();
    storage::save_tags(&dir.path().join("b.pdf"), &["x".to_string()]).unwrap();

    let mut index = Index::build(dir.path(), &[]).unwrap();
    let mutation = Mutation::untag("x").unwrap();
    let required = vec!["x".to_string(), "y".to_string()];
    let changed = index.apply_by_tags(&mutation, &required).unwrap();
    assert_eq!(changed, 1);
    assert_eq!(tags_of(&index, "a"), vec!["y".to_string()]);
    assert_eq!(tags_of(&index, "b"), vec!["x".to_string()]);
}

#[test]
fn tag_all_persists_every_record() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    let mut index = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(index.tag_all("seen").unwrap(), 2);

    // The writes must be durable, not just in-memory.
    let rebuilt = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(tags_of(&rebuilt, "a"), vec!["seen".to_string()]);
    assert_eq!(tags_of(&rebuilt, "b"), vec!["seen".to_string()]);
}

#[test]
fn out_of_range_position_mutates_nothing() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    let mut index = Index::build(dir.path(), &[]).unwrap();
    assert!(matches!(
        index.untag_at(5, "foo"),
        Err(CatalogError::Position {
            position: 5,
            count: 1
        })
    ));
    assert!(matches!(
        index.tag_at(1, "foo"),
        Err(CatalogError::Position { .. })
    ));
    assert!(index.record_at(0).unwrap().tags().is_empty());
}

#[test]
fn all_tags_is_sorted_and_deduped() {
    let dir = tempdir().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.pdf");
    if !xattr_supported(dir.path()) {
        return;
    }
    storage::save_tags(
        &dir.path().join("a.pdf"),
        &["zeta".to_string(), "alpha".to_string()],
    )
    .unwrap();
    storage::save_tags(
        &dir.path().join("b.pdf"),
        &["alpha".to_string(), "mid".to_string()],
    )
    .unwrap();

    let index = Index::build(dir.path(), &[]).unwrap();
    assert_eq!(
        index.all_tags(),
        vec!["alpha".to_string(), "mid".to_string(), "zeta".to_string()]
    );
}
