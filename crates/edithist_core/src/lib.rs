//! Core library for edithist: point-in-time reconstruction of files from an
//! editor change log (checkpoints, edits, loader, writer, config).

/// Checkpoint arena with alias resolution.
pub mod checkpoint;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants (layout names, env vars, synthetic defaults).
pub mod constants;
/// Time-ordered edit sequence of one file.
pub mod edit_log;
/// Error types.
pub mod error;
/// Per-file history construction.
pub mod history;
/// Reading change logs from zip files and directories.
pub mod loader;
/// Record and payload models.
pub mod models;
mod parallel;
/// Applying content changes to text buffers.
pub mod patch;
/// Version reconstruction queries.
pub mod resolver;
/// Synthetic linear histories.
pub mod synthetic;
/// Millisecond timestamps.
pub mod time;
/// Cross-file workspace index.
pub mod workspace;
/// Persisting histories back to the record layout.
pub mod writer;

#[cfg(test)]
mod test_support;

pub use checkpoint::{Checkpoint, CheckpointId, CheckpointStore, ResolvedCheckpoint};
pub use config::{Config, LayoutConfig, PatchPolicy};
pub use edit_log::{Edit, EditLog};
pub use error::{HistoryError, Result};
pub use history::{build_file_history, FileChangeHistory};
pub use loader::{load_workspace_history, open_workspace_history, Archive, LogSource};
pub use resolver::{ReplayPlan, Resolver};
pub use time::Timestamp;
pub use workspace::{build_workspace_history, WorkspaceChangeHistory};
