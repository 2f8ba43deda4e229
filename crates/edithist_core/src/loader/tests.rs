use super::*;
use crate::error::HistoryError;
use crate::time::Timestamp;

fn entries(records: &[(&str, &str)]) -> Archive {
    Archive::from_entries(
        records
            .iter()
            .map(|(path, text)| (PathBuf::from(path), text.to_string())),
        LayoutConfig::default(),
    )
}

fn two_file_archive() -> Archive {
    entries(&[
        (
            "metadata.json",
            r#"{"type":"local","hostname":"box","osUsername":"dev","workspaceName":"demo"}"#,
        ),
        ("a.txt/concrete/0", r#"{"type":"new","contents":"","mtime":0}"#),
        ("a.txt/concrete/5", r#"{"type":"same","prevMtime":0,"mtime":5}"#),
        (
            "a.txt/edits/1",
            r#"{"file":"a.txt","time":1,"baseTime":0,"changes":[{"range":{"start":{"line":0,"character":0},"end":{"line":0,"character":0}},"text":"a","rangeOffset":0,"rangeLength":0}]}"#,
        ),
        (
            "a.txt/edits/2",
            r#"{"file":"a.txt","time":2,"baseTime":0,"changes":[{"range":{"start":{"line":0,"character":1},"end":{"line":0,"character":1}},"text":"b","rangeOffset":1,"rangeLength":0}]}"#,
        ),
        ("src/b.rs/concrete/3", r#"{"type":"new","contents":"fn main() {}","mtime":3}"#),
        ("README.md", "not a record"),
        ("a.txt/notes/1", "{}"),
    ])
}

#[test]
fn flat_and_indexed_sources_agree() {
    let archive = two_file_archive();
    let flat = load_workspace_history(&FlatArchive::new(&archive)).expect("flat");
    let indexed = load_workspace_history(&IndexedArchive::new(&archive)).expect("indexed");
    assert_eq!(flat, indexed);

    let paths: Vec<_> = flat.paths().collect();
    assert_eq!(paths, vec![Path::new("a.txt"), Path::new("src/b.rs")]);
    assert_eq!(flat.total_num_edits(), 2);
}

#[test]
fn current_dir_prefixed_entries_load_like_plain_ones() {
    let plain = two_file_archive();
    let dotted = Archive::from_entries(
        plain
            .entries()
            .iter()
            .map(|(path, text)| (Path::new(".").join(path), text.clone())),
        LayoutConfig::default(),
    );
    assert_eq!(dotted.len(), plain.len());

    let expected = load_workspace_history(&IndexedArchive::new(&plain)).expect("plain");
    let flat = load_workspace_history(&FlatArchive::new(&dotted)).expect("flat");
    let indexed = load_workspace_history(&IndexedArchive::new(&dotted)).expect("indexed");
    assert_eq!(flat, expected);
    assert_eq!(indexed, expected);
    assert_eq!(indexed.len(), 2);
    assert!(indexed.metadata().is_some());
}

#[test]
fn tracked_files_ignore_noise_entries() {
    let archive = two_file_archive();
    let expected: BTreeSet<PathBuf> = ["a.txt", "src/b.rs"].iter().map(PathBuf::from).collect();
    assert_eq!(FlatArchive::new(&archive).tracked_files(), expected);
    assert_eq!(IndexedArchive::new(&archive).tracked_files(), expected);
}

#[test]
fn loaded_history_reconstructs_versions() {
    let archive = two_file_archive();
    let workspace = load_workspace_history(&IndexedArchive::new(&archive)).expect("load");
    assert_eq!(
        workspace
            .version_at_time("a.txt", Timestamp::from_millis(1))
            .expect("t1"),
        "a"
    );
    let latest = workspace.latest_versions().expect("latest");
    assert_eq!(latest[Path::new("a.txt")], "ab");
    assert_eq!(latest[Path::new("src/b.rs")], "fn main() {}");
    let file = workspace.file("a.txt").expect("a.txt");
    assert_eq!(file.checkpoints().len(), 2);
}

#[test]
fn metadata_is_decoded_when_present() {
    let archive = two_file_archive();
    let workspace = load_workspace_history(&FlatArchive::new(&archive)).expect("load");
    let metadata = workspace.metadata().expect("metadata");
    assert_eq!(metadata.workspace_name(), "demo");
    assert_eq!(metadata.hostname(), "box");
}

#[test]
fn file_with_edits_but_no_snapshots_is_rejected() {
    let archive = entries(&[(
        "a.txt/edits/1",
        r#"{"file":"a.txt","time":1,"baseTime":0,"changes":[]}"#,
    )]);
    let err = load_workspace_history(&IndexedArchive::new(&archive)).expect_err("missing");
    assert!(
        matches!(err, HistoryError::MissingCheckpoints(ref path) if path == Path::new("a.txt")),
        "unexpected error: {}",
        err
    );
}

#[test]
fn malformed_record_names_its_path() {
    let archive = entries(&[("a.txt/concrete/0", r#"{"type":"new","mtime":0}"#)]);
    let err = load_workspace_history(&FlatArchive::new(&archive)).expect_err("malformed");
    match err {
        HistoryError::MalformedRecord { record, .. } => assert_eq!(record, "a.txt/concrete/0"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn empty_archive_is_an_empty_workspace() {
    let archive = entries(&[]);
    let workspace = load_workspace_history(&IndexedArchive::new(&archive)).expect("empty");
    assert!(workspace.is_empty());
    assert!(workspace.metadata().is_none());
}

#[test]
fn directory_layout_loads_like_in_memory_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive = two_file_archive();
    for (path, text) in archive.entries() {
        let target = dir.path().join(path);
        std::fs::create_dir_all(target.parent().expect("parent")).expect("mkdir");
        std::fs::write(&target, text).expect("write");
    }
    std::fs::write(dir.path().join("README.md"), "noise").expect("noise");

    let from_disk = open_workspace_history(dir.path(), &LayoutConfig::default()).expect("open");
    let in_memory = load_workspace_history(&IndexedArchive::new(&archive)).expect("memory");
    assert_eq!(from_disk, in_memory);
}

#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = open_workspace_history(&dir.path().join("absent.zip"), &LayoutConfig::default())
        .expect_err("missing");
    assert!(
        matches!(err, HistoryError::EmptyOrMissingArchive(_)),
        "unexpected error: {}",
        err
    );
}
