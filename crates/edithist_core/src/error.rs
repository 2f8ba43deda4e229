//! Error types for loading, validating, and querying change histories.
use crate::time::Timestamp;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the change-history engine.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },

    #[error("Checkpoint {mtime} of {path} references unknown previous checkpoint {prev}")]
    DanglingCheckpointReference {
        path: PathBuf,
        prev: Timestamp,
        mtime: Timestamp,
    },

    #[error("Checkpoint {mtime} of {path} must be newer than its previous checkpoint {prev}")]
    CheckpointOrder {
        path: PathBuf,
        prev: Timestamp,
        mtime: Timestamp,
    },

    #[error("Duplicate checkpoint {mtime} for {path}")]
    DuplicateCheckpoint { path: PathBuf, mtime: Timestamp },

    #[error("No checkpoints recorded for {0}")]
    MissingCheckpoints(PathBuf),

    #[error("Edit at {time} of {path} is anchored to unknown checkpoint {base}")]
    UnknownBaseCheckpoint {
        path: PathBuf,
        base: Timestamp,
        time: Timestamp,
    },

    #[error("Edit at {time} of {path} predates its base checkpoint {base}")]
    EditBeforeBase {
        path: PathBuf,
        base: Timestamp,
        time: Timestamp,
    },

    #[error(
        "Malformed patch: replacing {length} chars at offset {offset} in a buffer of {buffer_len} chars"
    )]
    MalformedPatch {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    #[error("No history for {0}")]
    NotFound(PathBuf),

    #[error("Edit index {index} out of range for {path} ({len} edits)")]
    IndexOutOfRange {
        path: PathBuf,
        index: usize,
        len: usize,
    },

    #[error("Duplicate file history for {0}")]
    DuplicateFile(PathBuf),

    #[error("Record key {0} would be written twice")]
    DuplicateRecordKey(PathBuf),

    #[error("No change log found at {0}")]
    EmptyOrMissingArchive(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl HistoryError {
    /// Build a [`HistoryError::MalformedRecord`] from any displayable cause.
    pub(crate) fn malformed(record: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HistoryError>;
