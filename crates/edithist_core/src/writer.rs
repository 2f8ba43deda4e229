//! Writer: persists a workspace history in the layout the loader reads.
//!
//! Each checkpoint lands at `<file>/<concrete dir>/<mtime>` and each edit at
//! `<file>/<edits dir>/<time>`, both as compact JSON; metadata, when present,
//! goes to the metadata file at the root.

use crate::checkpoint::Checkpoint;
use crate::config::LayoutConfig;
use crate::error::{HistoryError, Result};
use crate::history::FileChangeHistory;
use crate::models::{encode_record, RawCheckpoint, RawEdit};
use crate::time::Timestamp;
use crate::workspace::WorkspaceChangeHistory;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

fn insert_unique(
    entries: &mut BTreeMap<PathBuf, String>,
    key: PathBuf,
    text: String,
) -> Result<()> {
    if entries.contains_key(&key) {
        return Err(HistoryError::DuplicateRecordKey(key));
    }
    entries.insert(key, text);
    Ok(())
}

fn record_key(file: &Path, dir: &str, time: Timestamp) -> PathBuf {
    file.join(dir).join(time.as_millis().to_string())
}

fn raw_checkpoint(file: &FileChangeHistory, checkpoint: &Checkpoint) -> Result<RawCheckpoint> {
    Ok(match checkpoint {
        Checkpoint::Snapshot { contents, mtime } => RawCheckpoint::New {
            contents: contents.clone(),
            mtime: *mtime,
        },
        Checkpoint::Alias { prev, mtime } => RawCheckpoint::Same {
            prev_mtime: file
                .checkpoints()
                .mtime_of(*prev)
                .ok_or_else(|| HistoryError::NotFound(file.path().to_path_buf()))?,
            mtime: *mtime,
        },
    })
}

fn file_entries(
    file: &FileChangeHistory,
    layout: &LayoutConfig,
    entries: &mut BTreeMap<PathBuf, String>,
) -> Result<()> {
    for (_, checkpoint) in file.checkpoints().iter() {
        let key = record_key(file.path(), &layout.concrete_dir, checkpoint.mtime());
        let text = encode_record(&key.display().to_string(), &raw_checkpoint(file, checkpoint)?)?;
        insert_unique(entries, key, text)?;
    }
    for edit in file.edits() {
        let base_time = file
            .checkpoints()
            .mtime_of(edit.base)
            .ok_or_else(|| HistoryError::NotFound(file.path().to_path_buf()))?;
        let raw = RawEdit {
            file: edit.file.clone(),
            time: edit.time,
            base_time,
            changes: edit.changes.clone(),
        };
        let key = record_key(file.path(), &layout.edits_dir, edit.time);
        let text = encode_record(&key.display().to_string(), &raw)?;
        insert_unique(entries, key, text)?;
    }
    Ok(())
}

/// Every record of `history` keyed by archive-relative path.
///
/// # Errors
/// Returns [`HistoryError::DuplicateRecordKey`] when two edits of one file
/// share a timestamp, since their record keys would collide.
pub fn to_entries(
    history: &WorkspaceChangeHistory,
    layout: &LayoutConfig,
) -> Result<BTreeMap<PathBuf, String>> {
    let mut entries = BTreeMap::new();
    if let Some(metadata) = history.metadata() {
        let text = encode_record(&layout.metadata_file, metadata)?;
        insert_unique(&mut entries, PathBuf::from(&layout.metadata_file), text)?;
    }
    for file in history.files() {
        file_entries(file, layout, &mut entries)?;
    }
    Ok(entries)
}

fn zip_name(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `history` as a zip archive at `path`, replacing any existing file.
///
/// # Errors
/// Any [`to_entries`] failure, plus IO and zip errors.
pub fn write_zip(
    history: &WorkspaceChangeHistory,
    layout: &LayoutConfig,
    path: &Path,
) -> Result<()> {
    let entries = to_entries(history, layout)?;
    let mut zip = zip::ZipWriter::new(File::create(path)?);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, text) in &entries {
        zip.start_file(zip_name(name), options)?;
        zip.write_all(text.as_bytes())?;
    }
    zip.finish()?;
    tracing::info!("Wrote {} record(s) to {}", entries.len(), path.display());
    Ok(())
}

/// Write `history` as a directory tree under `root`, creating it if needed.
///
/// # Errors
/// Any [`to_entries`] failure, plus IO errors.
pub fn write_dir(
    history: &WorkspaceChangeHistory,
    layout: &LayoutConfig,
    root: &Path,
) -> Result<()> {
    let entries = to_entries(history, layout)?;
    for (name, text) in &entries {
        let target = root.join(name);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, text)?;
    }
    tracing::info!("Wrote {} record(s) under {}", entries.len(), root.display());
    Ok(())
}
