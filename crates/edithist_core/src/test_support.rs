//! Shared test-only helpers for edithist_core.

use crate::history::{build_file_history, FileChangeHistory};
use crate::models::{ContentChange, Position, RawCheckpoint, RawEdit};
use crate::time::Timestamp;

pub(crate) fn ts(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis)
}

/// `{"type":"new"}` record.
pub(crate) fn snapshot(contents: &str, mtime: i64) -> RawCheckpoint {
    RawCheckpoint::New {
        contents: contents.to_string(),
        mtime: ts(mtime),
    }
}

/// `{"type":"same"}` record.
pub(crate) fn alias(prev_mtime: i64, mtime: i64) -> RawCheckpoint {
    RawCheckpoint::Same {
        prev_mtime: ts(prev_mtime),
        mtime: ts(mtime),
    }
}

/// Single-line insertion of `text` at character `offset`.
pub(crate) fn append_edit(file: &str, time: i64, base: i64, offset: usize, text: &str) -> RawEdit {
    RawEdit {
        file: file.to_string(),
        time: ts(time),
        base_time: ts(base),
        changes: vec![ContentChange::insert(Position::new(0, offset), offset, text)],
    }
}

/// Two anchors with two edits each:
///
/// - `C1` at t=0 holds `"base"`; `e1` (t=10) and `e2` (t=20) append `"1"`, `"2"`.
/// - `C2` at t=30 holds `"fresh"`; `e3` (t=40) and `e4` (t=50) append `"3"`, `"4"`.
///
/// # Panics
/// Panics if the fixture fails to build.
pub(crate) fn boundary_history(path: &str) -> FileChangeHistory {
    build_file_history(
        path,
        vec![snapshot("base", 0), snapshot("fresh", 30)],
        vec![
            append_edit(path, 10, 0, 4, "1"),
            append_edit(path, 20, 0, 5, "2"),
            append_edit(path, 40, 30, 5, "3"),
            append_edit(path, 50, 30, 6, "4"),
        ],
    )
    .expect("boundary fixture")
}
