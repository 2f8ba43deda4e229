//! Workspace index: every tracked file's history, keyed and ordered by path.

use crate::error::{HistoryError, Result};
use crate::history::FileChangeHistory;
use crate::models::ChangeMetadata;
use crate::resolver::Resolver;
use crate::time::Timestamp;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Full change log of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceChangeHistory {
    metadata: Option<ChangeMetadata>,
    files: BTreeMap<PathBuf, FileChangeHistory>,
}

/// Assemble a workspace from per-file histories.
///
/// An empty `files` list is a valid, empty workspace.
///
/// # Errors
/// Returns [`HistoryError::DuplicateFile`] when two histories share a path.
pub fn build_workspace_history(
    files: impl IntoIterator<Item = FileChangeHistory>,
    metadata: Option<ChangeMetadata>,
) -> Result<WorkspaceChangeHistory> {
    let mut by_path = BTreeMap::new();
    for file in files {
        let path = file.path().to_path_buf();
        if by_path.insert(path.clone(), file).is_some() {
            return Err(HistoryError::DuplicateFile(path));
        }
    }
    Ok(WorkspaceChangeHistory {
        metadata,
        files: by_path,
    })
}

impl WorkspaceChangeHistory {
    pub fn metadata(&self) -> Option<&ChangeMetadata> {
        self.metadata.as_ref()
    }

    /// Histories in ascending path order.
    pub fn files(&self) -> impl Iterator<Item = &FileChangeHistory> {
        self.files.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// History of one tracked file.
    ///
    /// # Errors
    /// Returns [`HistoryError::NotFound`] for untracked paths.
    pub fn file(&self, path: impl AsRef<Path>) -> Result<&FileChangeHistory> {
        let path = path.as_ref();
        self.files
            .get(path)
            .ok_or_else(|| HistoryError::NotFound(path.to_path_buf()))
    }

    /// Sum of edit counts over all files.
    pub fn total_num_edits(&self) -> usize {
        self.files.values().map(FileChangeHistory::num_edits).sum()
    }

    /// Text of `path` as of `time` under the default strict resolver.
    pub fn version_at_time(&self, path: impl AsRef<Path>, time: Timestamp) -> Result<String> {
        Resolver::default().version_at_time(self.file(path)?, time)
    }

    /// Whole-workspace snapshot at the moment `path`'s `index`-th edit happened.
    pub fn version_at_edit_index(
        &self,
        path: impl AsRef<Path>,
        index: usize,
    ) -> Result<BTreeMap<PathBuf, String>> {
        Resolver::default().version_at_edit_index(self, path, index)
    }

    /// Every file at the end of its history.
    pub fn latest_versions(&self) -> Result<BTreeMap<PathBuf, String>> {
        Resolver::default().versions_at_time(self, Timestamp::MAX)
    }
}

impl Resolver {
    /// Cross-file snapshot as of the time of `path`'s `index`-th edit.
    ///
    /// Every file's clock is assumed comparable; the chosen edit's time is
    /// used as a global cutoff.
    ///
    /// # Errors
    /// - [`HistoryError::NotFound`] if `path` is untracked.
    /// - [`HistoryError::IndexOutOfRange`] if `index >= edit count`.
    /// - Any replay error from an individual file.
    pub fn version_at_edit_index(
        &self,
        workspace: &WorkspaceChangeHistory,
        path: impl AsRef<Path>,
        index: usize,
    ) -> Result<BTreeMap<PathBuf, String>> {
        let file = workspace.file(path)?;
        let edit = file
            .edits()
            .get(index)
            .ok_or_else(|| HistoryError::IndexOutOfRange {
                path: file.path().to_path_buf(),
                index,
                len: file.num_edits(),
            })?;
        self.versions_at_time(workspace, edit.time)
    }

    /// Every file reconstructed at `time`.
    pub fn versions_at_time(
        &self,
        workspace: &WorkspaceChangeHistory,
        time: Timestamp,
    ) -> Result<BTreeMap<PathBuf, String>> {
        crate::parallel::map_files(workspace.files.values(), |file| {
            Ok((file.path().to_path_buf(), self.version_at_time(file, time)?))
        })
        .map(|versions| versions.into_iter().collect())
    }
}
