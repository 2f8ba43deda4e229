//! Data models for change-log records and edit payloads.

/// Positions, ranges, and content changes.
pub mod change;
/// Workspace authoring metadata.
pub mod metadata;
/// Raw snapshot and edit records.
pub mod records;

pub use change::{ContentChange, Position, Range};
pub use metadata::{ChangeMetadata, GitMetadata, GitRemote, LocalMetadata};
pub use records::{decode_record, encode_record, RawCheckpoint, RawEdit};
