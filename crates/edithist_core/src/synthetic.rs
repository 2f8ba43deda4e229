//! Synthetic change logs for tests and demos.
//!
//! A linear history types a file out one character at a time onto an empty
//! snapshot, so the version after edit `i` is exactly the first `i + 1`
//! characters of the file.

use crate::constants::{DEFAULT_SYNTHETIC_DELTA_MS, DEFAULT_SYNTHETIC_START_MS};
use crate::error::Result;
use crate::history::{build_file_history, FileChangeHistory};
use crate::models::{
    ChangeMetadata, ContentChange, LocalMetadata, Position, Range, RawCheckpoint, RawEdit,
};
use crate::time::Timestamp;
use crate::workspace::{build_workspace_history, WorkspaceChangeHistory};
use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Workspace name recorded by [`linear_workspace_history`].
pub const SYNTHETIC_WORKSPACE_NAME: &str = "test-workspace";

fn env_or_unknown(names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Local authoring metadata for this machine and user.
///
/// Host and user names come from the environment (`HOSTNAME`/`COMPUTERNAME`
/// and `USER`/`USERNAME`) and fall back to `"unknown"`.
pub fn local_metadata(workspace_name: &str) -> ChangeMetadata {
    ChangeMetadata::Local(LocalMetadata {
        hostname: env_or_unknown(&["HOSTNAME", "COMPUTERNAME"]),
        os_username: env_or_unknown(&["USER", "USERNAME"]),
        workspace_name: workspace_name.to_string(),
    })
}

/// History that types `contents` into an empty file, one character per edit.
///
/// The snapshot sits at `start`; edit `i` happens at
/// `start + (i + 1) * delta_ms` and inserts character `i` at the end.
///
/// # Errors
/// Propagates [`build_file_history`] failures, which only occur for a
/// non-positive `delta_ms` with more than one character.
pub fn linear_file_history(
    path: impl Into<PathBuf>,
    contents: &str,
    start: Timestamp,
    delta_ms: i64,
) -> Result<FileChangeHistory> {
    let path = path.into();
    let file = path.display().to_string();
    let mut edits = Vec::new();
    let mut time = start;
    let mut at = Position::new(0, 0);
    for (offset, ch) in contents.chars().enumerate() {
        time = time.offset_millis(delta_ms);
        let change = ContentChange {
            range: Range::new(at, at),
            text: ch.to_string(),
            range_offset: offset,
            range_length: 0,
        };
        edits.push(RawEdit {
            file: file.clone(),
            time,
            base_time: start,
            changes: vec![change],
        });
        at = if ch == '\n' {
            Position::new(at.line + 1, 0)
        } else {
            Position::new(at.line, at.character + 1)
        };
    }
    let snapshot = RawCheckpoint::New {
        contents: String::new(),
        mtime: start,
    };
    build_file_history(path, vec![snapshot], edits)
}

/// Linear history for every file under `root`, keyed by path relative to
/// `root`, with [`local_metadata`].
///
/// Every file starts from the same instant, so cross-file snapshots line up
/// by edit position.
///
/// # Errors
/// Returns [`crate::HistoryError::Io`] for unreadable or non-UTF-8 files.
pub fn linear_workspace_history(root: &Path) -> Result<WorkspaceChangeHistory> {
    let start = Timestamp::from_millis(DEFAULT_SYNTHETIC_START_MS);
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let contents = std::fs::read_to_string(entry.path())?;
        let history = linear_file_history(relative, &contents, start, DEFAULT_SYNTHETIC_DELTA_MS)?;
        files.push(history);
    }
    tracing::debug!("Generated linear history for {} file(s)", files.len());
    build_workspace_history(files, Some(local_metadata(SYNTHETIC_WORKSPACE_NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ts;

    #[test]
    fn one_edit_per_character() {
        let history = linear_file_history("a.txt", "hi\nyo", ts(0), 10).expect("linear");
        assert_eq!(history.num_edits(), 5);
        assert_eq!(history.checkpoints().len(), 1);
        let times: Vec<_> = history.edits().iter().map(|edit| edit.time.as_millis()).collect();
        assert_eq!(times, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn ranges_track_lines_and_columns() {
        let history = linear_file_history("a.txt", "ab\nc", ts(0), 1).expect("linear");
        let starts: Vec<_> = history
            .edits()
            .iter()
            .map(|edit| edit.changes[0].range.start)
            .collect();
        assert_eq!(
            starts,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 0),
            ]
        );
    }

    #[test]
    fn empty_contents_give_a_bare_snapshot() {
        let history = linear_file_history("empty.txt", "", ts(5), 100).expect("linear");
        assert_eq!(history.num_edits(), 0);
        assert_eq!(
            crate::resolver::Resolver::default()
                .latest_version(&history)
                .expect("latest"),
            ""
        );
    }

    #[test]
    fn local_metadata_names_the_workspace() {
        let metadata = local_metadata("demo");
        assert_eq!(metadata.workspace_name(), "demo");
        assert!(!metadata.hostname().is_empty());
    }
}
