//! Per-file change history and its construction from raw records.

use crate::checkpoint::{CheckpointId, CheckpointStore};
use crate::edit_log::{Edit, EditLog};
use crate::error::{HistoryError, Result};
use crate::models::{RawCheckpoint, RawEdit};
use std::path::{Path, PathBuf};

/// Everything recorded about one file: its checkpoints, its edits, and the
/// newest checkpoint known when the log was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeHistory {
    path: PathBuf,
    checkpoints: CheckpointStore,
    edits: EditLog,
    last_checkpoint: CheckpointId,
}

impl FileChangeHistory {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Edits in ascending time order.
    pub fn edits(&self) -> &EditLog {
        &self.edits
    }

    pub fn last_checkpoint(&self) -> CheckpointId {
        self.last_checkpoint
    }

    pub fn num_edits(&self) -> usize {
        self.edits.len()
    }
}

/// Build one file's history from decoded records.
///
/// Checkpoints are registered in ascending mtime order so every alias finds
/// its referent already present; edits are then bound to their anchors and
/// sorted by time.
///
/// # Arguments
/// - `path`: Tracked file path.
/// - `raw_checkpoints`: Snapshot records in any order.
/// - `raw_edits`: Edit records in any order (possibly empty).
///
/// # Errors
/// - [`HistoryError::MissingCheckpoints`] when no checkpoint was recorded.
/// - [`HistoryError::DanglingCheckpointReference`],
///   [`HistoryError::CheckpointOrder`], [`HistoryError::DuplicateCheckpoint`]
///   for broken snapshot records.
/// - [`HistoryError::UnknownBaseCheckpoint`] or
///   [`HistoryError::EditBeforeBase`] for edits whose anchor is unusable.
pub fn build_file_history(
    path: impl Into<PathBuf>,
    mut raw_checkpoints: Vec<RawCheckpoint>,
    raw_edits: Vec<RawEdit>,
) -> Result<FileChangeHistory> {
    let path = path.into();
    raw_checkpoints.sort_by_key(RawCheckpoint::mtime);

    let mut checkpoints = CheckpointStore::new(path.clone());
    for raw in raw_checkpoints {
        match raw {
            RawCheckpoint::New { contents, mtime } => {
                checkpoints.register_snapshot(contents, mtime)?;
            }
            RawCheckpoint::Same { prev_mtime, mtime } => {
                checkpoints.register_alias(prev_mtime, mtime)?;
            }
        }
    }
    let last_checkpoint = checkpoints
        .last()
        .ok_or_else(|| HistoryError::MissingCheckpoints(path.clone()))?;

    let mut edits = Vec::with_capacity(raw_edits.len());
    for raw in raw_edits {
        let Some(base) = checkpoints.lookup(raw.base_time) else {
            return Err(HistoryError::UnknownBaseCheckpoint {
                path,
                base: raw.base_time,
                time: raw.time,
            });
        };
        if raw.time < raw.base_time {
            return Err(HistoryError::EditBeforeBase {
                path,
                base: raw.base_time,
                time: raw.time,
            });
        }
        edits.push(Edit {
            file: raw.file,
            time: raw.time,
            base,
            changes: raw.changes,
        });
    }

    tracing::debug!(
        "Built history for {}: {} checkpoints, {} edits",
        path.display(),
        checkpoints.len(),
        edits.len()
    );

    Ok(FileChangeHistory {
        path,
        checkpoints,
        edits: EditLog::new(edits),
        last_checkpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::Checkpoint;
    use crate::models::RawCheckpoint;
    use crate::test_support::{append_edit, snapshot, ts};

    #[test]
    fn registers_checkpoints_in_mtime_order_regardless_of_input_order() {
        let history = build_file_history(
            "a.txt",
            vec![
                RawCheckpoint::Same {
                    prev_mtime: ts(10),
                    mtime: ts(20),
                },
                snapshot("base", 10),
            ],
            Vec::new(),
        )
        .expect("history");

        let store = history.checkpoints();
        assert_eq!(store.len(), 2);
        let last = store.get(history.last_checkpoint()).expect("last");
        assert!(matches!(last, Checkpoint::Alias { mtime, .. } if *mtime == ts(20)));
        assert_eq!(
            store.resolve(history.last_checkpoint()).expect("resolve").contents,
            "base"
        );
    }

    #[test]
    fn binds_edits_to_anchors_and_sorts_by_time() {
        let history = build_file_history(
            "a.txt",
            vec![snapshot("", 0)],
            vec![append_edit("a.txt", 20, 0, 1, "b"), append_edit("a.txt", 10, 0, 0, "a")],
        )
        .expect("history");
        let times: Vec<i64> = history.edits().iter().map(|e| e.time.as_millis()).collect();
        assert_eq!(times, vec![10, 20]);
        let anchor = history.checkpoints().lookup(ts(0)).expect("anchor");
        assert!(history.edits().iter().all(|e| e.base == anchor));
        assert_eq!(history.num_edits(), 2);
    }

    #[test]
    fn no_checkpoints_is_an_error() {
        let err = build_file_history("a.txt", Vec::new(), Vec::new()).expect_err("missing");
        assert!(matches!(err, HistoryError::MissingCheckpoints(ref p) if p == Path::new("a.txt")));
    }

    #[test]
    fn edit_with_unknown_base_is_an_error() {
        let err = build_file_history(
            "a.txt",
            vec![snapshot("", 0)],
            vec![append_edit("a.txt", 10, 5, 0, "a")],
        )
        .expect_err("unknown base");
        assert!(matches!(err, HistoryError::UnknownBaseCheckpoint { base, .. } if base == ts(5)));
    }

    #[test]
    fn edit_before_its_base_is_an_error() {
        let err = build_file_history(
            "a.txt",
            vec![snapshot("", 50)],
            vec![append_edit("a.txt", 10, 50, 0, "a")],
        )
        .expect_err("edit before base");
        assert!(matches!(err, HistoryError::EditBeforeBase { .. }));
    }

    #[test]
    fn dangling_alias_aborts_the_build() {
        let err = build_file_history(
            "a.txt",
            vec![
                snapshot("base", 10),
                RawCheckpoint::Same {
                    prev_mtime: ts(15),
                    mtime: ts(20),
                },
            ],
            Vec::new(),
        )
        .expect_err("dangling");
        assert!(matches!(err, HistoryError::DanglingCheckpointReference { .. }));
    }
}
