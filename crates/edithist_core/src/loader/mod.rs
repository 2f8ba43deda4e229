//! Loader: turns persisted change-log records into a workspace history.
//!
//! Records come from an [`Archive`] (zip file, directory, or in-memory
//! entries) and are looked up through a [`LogSource`]. Two sources exist for
//! the two physical layouts: [`FlatArchive`] scans the flat path map by
//! prefix, [`IndexedArchive`] walks a pre-built [`PathTree`]. Both yield the
//! same histories for the same content.

/// Flat record archive and path classification.
pub mod archive;
/// Directory tree over archive paths.
pub mod tree;

pub use archive::{classify, is_important_path, normalize, Archive, EntryKind};
pub use tree::{PathNode, PathTree};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::history::build_file_history;
use crate::models::{decode_record, ChangeMetadata, RawCheckpoint, RawEdit};
use crate::parallel;
use crate::workspace::{build_workspace_history, WorkspaceChangeHistory};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Raw records for every tracked file of one change log.
pub trait LogSource {
    /// Paths with at least one snapshot or edit record.
    fn tracked_files(&self) -> BTreeSet<PathBuf>;

    /// Snapshot records of `path` in key order.
    fn raw_checkpoints(&self, path: &Path) -> Result<Vec<RawCheckpoint>>;

    /// Edit records of `path` in key order; empty when none were recorded.
    fn raw_edits(&self, path: &Path) -> Result<Vec<RawEdit>>;

    /// Workspace metadata record, if present.
    fn metadata(&self) -> Result<Option<ChangeMetadata>>;
}

fn decode_all<T: serde::de::DeserializeOwned>(records: Vec<(&Path, &str)>) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|(path, text)| decode_record(&path.display().to_string(), text))
        .collect()
}

fn decode_metadata(archive: &Archive) -> Result<Option<ChangeMetadata>> {
    let name = archive.layout().metadata_file.as_str();
    archive
        .get(Path::new(name))
        .map(|text| decode_record(name, text))
        .transpose()
}

/// Prefix scans over the flat path map.
#[derive(Debug, Clone, Copy)]
pub struct FlatArchive<'a> {
    archive: &'a Archive,
}

impl<'a> FlatArchive<'a> {
    pub fn new(archive: &'a Archive) -> Self {
        Self { archive }
    }

    fn collection(&self, path: &Path, dir: &str) -> Vec<(&'a Path, &'a str)> {
        let prefix = path.join(dir);
        self.archive
            .under(&prefix)
            .filter(|(entry, _)| entry.parent() == Some(prefix.as_path()))
            .collect()
    }
}

impl LogSource for FlatArchive<'_> {
    fn tracked_files(&self) -> BTreeSet<PathBuf> {
        let layout = self.archive.layout();
        self.archive
            .entries()
            .keys()
            .filter_map(|path| match classify(path, layout)? {
                EntryKind::Checkpoint { file, .. } | EntryKind::Edit { file, .. } => Some(file),
                EntryKind::Metadata => None,
            })
            .collect()
    }

    fn raw_checkpoints(&self, path: &Path) -> Result<Vec<RawCheckpoint>> {
        decode_all(self.collection(path, &self.archive.layout().concrete_dir))
    }

    fn raw_edits(&self, path: &Path) -> Result<Vec<RawEdit>> {
        decode_all(self.collection(path, &self.archive.layout().edits_dir))
    }

    fn metadata(&self) -> Result<Option<ChangeMetadata>> {
        decode_metadata(self.archive)
    }
}

/// Lookups through a [`PathTree`] built once over the archive's paths.
#[derive(Debug, Clone)]
pub struct IndexedArchive<'a> {
    archive: &'a Archive,
    tree: PathTree,
}

impl<'a> IndexedArchive<'a> {
    pub fn new(archive: &'a Archive) -> Self {
        let tree = PathTree::build(archive.entries().keys().map(PathBuf::as_path));
        Self { archive, tree }
    }

    fn collect_tracked(&self, dir: &PathTree, at: &Path, out: &mut BTreeSet<PathBuf>) {
        let layout = self.archive.layout();
        for (name, node) in dir.children() {
            let PathNode::Dir(child) = node else {
                continue;
            };
            let is_collection = *name == layout.concrete_dir || *name == layout.edits_dir;
            if is_collection && !at.as_os_str().is_empty() && child.files().next().is_some() {
                out.insert(at.to_path_buf());
            }
            self.collect_tracked(child, &at.join(name), out);
        }
    }

    fn collection(&self, path: &Path, dir: &str) -> Result<Vec<(&'a Path, &'a str)>> {
        let Some(node) = self.tree.find_dir(&path.join(dir)) else {
            return Ok(Vec::new());
        };
        let archive = self.archive;
        let mut records = Vec::new();
        for leaf in node.files() {
            if let Some((key, text)) = archive.entries().get_key_value(leaf) {
                records.push((key.as_path(), text.as_str()));
            }
        }
        Ok(records)
    }
}

impl LogSource for IndexedArchive<'_> {
    fn tracked_files(&self) -> BTreeSet<PathBuf> {
        let mut out = BTreeSet::new();
        self.collect_tracked(&self.tree, Path::new(""), &mut out);
        out
    }

    fn raw_checkpoints(&self, path: &Path) -> Result<Vec<RawCheckpoint>> {
        let dir = &self.archive.layout().concrete_dir;
        decode_all(self.collection(path, dir)?)
    }

    fn raw_edits(&self, path: &Path) -> Result<Vec<RawEdit>> {
        let dir = &self.archive.layout().edits_dir;
        decode_all(self.collection(path, dir)?)
    }

    fn metadata(&self) -> Result<Option<ChangeMetadata>> {
        decode_metadata(self.archive)
    }
}

/// Build a full workspace history from `source`.
///
/// Any decode or integrity failure aborts the whole load; zero tracked files
/// yields a valid empty workspace.
///
/// # Errors
/// Propagates the first [`crate::HistoryError`] from any file.
pub fn load_workspace_history<S: LogSource + Sync>(source: &S) -> Result<WorkspaceChangeHistory> {
    let tracked = source.tracked_files();
    let files = parallel::map_files(tracked, |path| {
        let checkpoints = source.raw_checkpoints(&path)?;
        let edits = source.raw_edits(&path)?;
        build_file_history(path, checkpoints, edits)
    })?;
    let metadata = source.metadata()?;
    let workspace = build_workspace_history(files, metadata)?;
    tracing::info!(
        "Loaded change log: {} file(s), {} edit(s)",
        workspace.len(),
        workspace.total_num_edits()
    );
    Ok(workspace)
}

/// Open a zip file or directory at `path` and load it.
///
/// # Errors
/// Returns [`crate::HistoryError::EmptyOrMissingArchive`] when nothing exists
/// at `path`, plus any load failure.
pub fn open_workspace_history(
    path: &Path,
    layout: &LayoutConfig,
) -> Result<WorkspaceChangeHistory> {
    let archive = Archive::open(path, layout.clone())?;
    load_workspace_history(&IndexedArchive::new(&archive))
}

#[cfg(test)]
mod tests;
