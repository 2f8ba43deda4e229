//! Flat archive of change-log records, read from a zip file or a directory.

use crate::config::LayoutConfig;
use crate::error::{HistoryError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::ops::Bound;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// What an archive path holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Metadata,
    Checkpoint { file: PathBuf, key: i64 },
    Edit { file: PathBuf, key: i64 },
}

fn normal_parts(path: &Path) -> Option<Vec<&str>> {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect()
}

/// `path` with `.` components removed, or `None` if it is absolute, climbs
/// with `..`, or is not UTF-8.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    normal_parts(path).map(|parts| parts.iter().collect())
}

/// Classify an archive-relative path under `layout`.
///
/// Record paths look like `<file path>/<concrete|edits>/<integer key>` with at
/// least one component of file path; anything else except the metadata file
/// is noise.
pub fn classify(path: &Path, layout: &LayoutConfig) -> Option<EntryKind> {
    let parts = normal_parts(path)?;
    if parts.iter().collect::<PathBuf>() == Path::new(&layout.metadata_file) {
        return Some(EntryKind::Metadata);
    }
    if parts.len() < 3 {
        return None;
    }
    let key = parts[parts.len() - 1].parse::<i64>().ok()?;
    let collection = parts[parts.len() - 2];
    let file: PathBuf = parts[..parts.len() - 2].iter().collect();
    if collection == layout.concrete_dir {
        Some(EntryKind::Checkpoint { file, key })
    } else if collection == layout.edits_dir {
        Some(EntryKind::Edit { file, key })
    } else {
        None
    }
}

/// Whether `path` carries a record the loader needs.
pub fn is_important_path(path: &Path, layout: &LayoutConfig) -> bool {
    classify(path, layout).is_some()
}

/// Record texts keyed by archive-relative path, filtered to important
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    layout: LayoutConfig,
    entries: BTreeMap<PathBuf, String>,
}

impl Archive {
    /// Build from in-memory `(path, text)` pairs, dropping unimportant paths.
    ///
    /// Kept entries are keyed by their [`normalize`]d path, so `./a.txt/edits/1`
    /// and `a.txt/edits/1` name the same record.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (PathBuf, String)>,
        layout: LayoutConfig,
    ) -> Self {
        let mut kept = BTreeMap::new();
        for (path, text) in entries {
            let normalized = match normalize(&path) {
                Some(normalized) if is_important_path(&normalized, &layout) => normalized,
                _ => {
                    tracing::trace!("Skipping archive entry {}", path.display());
                    continue;
                }
            };
            if kept.insert(normalized, text).is_some() {
                tracing::warn!("Archive entry {} replaces an earlier record", path.display());
            }
        }
        Self {
            layout,
            entries: kept,
        }
    }

    /// Open a zip file or a directory, whichever `path` is.
    ///
    /// # Errors
    /// Returns [`HistoryError::EmptyOrMissingArchive`] when `path` does not
    /// exist, plus any read or decode failure.
    pub fn open(path: &Path, layout: LayoutConfig) -> Result<Self> {
        if path.is_dir() {
            Self::read_dir(path, layout)
        } else {
            Self::read_zip(path, layout)
        }
    }

    /// Read every important entry of a zip archive.
    ///
    /// The file handle is released before returning.
    ///
    /// # Errors
    /// - [`HistoryError::EmptyOrMissingArchive`] if `path` does not exist.
    /// - [`HistoryError::Archive`] if the zip cannot be parsed.
    /// - [`HistoryError::MalformedRecord`] if an entry is not UTF-8.
    pub fn read_zip(path: &Path, layout: LayoutConfig) -> Result<Self> {
        if !path.exists() {
            return Err(HistoryError::EmptyOrMissingArchive(path.to_path_buf()));
        }
        let mut zip = zip::ZipArchive::new(File::open(path)?)?;
        let mut entries = Vec::new();
        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = PathBuf::from(entry.name());
            if !is_important_path(&name, &layout) {
                tracing::trace!("Skipping archive entry {}", name.display());
                continue;
            }
            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .map_err(|err| HistoryError::malformed(entry.name(), err))?;
            entries.push((name, text));
        }
        tracing::debug!("Read {} record(s) from {}", entries.len(), path.display());
        Ok(Self::from_entries(entries, layout))
    }

    /// Read every important file below `root`, keyed relative to `root`.
    ///
    /// # Errors
    /// - [`HistoryError::EmptyOrMissingArchive`] if `root` does not exist.
    /// - [`HistoryError::Io`] for unreadable files or directories.
    pub fn read_dir(root: &Path, layout: LayoutConfig) -> Result<Self> {
        if !root.exists() {
            return Err(HistoryError::EmptyOrMissingArchive(root.to_path_buf()));
        }
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if !is_important_path(relative, &layout) {
                continue;
            }
            let text = std::fs::read_to_string(entry.path()).map_err(|err| {
                if err.kind() == std::io::ErrorKind::InvalidData {
                    HistoryError::malformed(relative.display().to_string(), err)
                } else {
                    HistoryError::Io(err)
                }
            })?;
            entries.push((relative.to_path_buf(), text));
        }
        tracing::debug!("Read {} record(s) from {}", entries.len(), root.display());
        Ok(Self::from_entries(entries, layout))
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn entries(&self) -> &BTreeMap<PathBuf, String> {
        &self.entries
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose path lies under `prefix`, in path order.
    pub fn under<'a>(
        &'a self,
        prefix: &Path,
    ) -> impl Iterator<Item = (&'a Path, &'a str)> + 'a {
        let owned = prefix.to_path_buf();
        self.entries
            .range::<Path, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(path, _)| path.starts_with(&owned))
            .map(|(path, text)| (path.as_path(), text.as_str()))
    }
}
