//! Patch applier: replays range replacements onto a text buffer.
//!
//! Offsets count Unicode scalar values in the buffer as it stands when the
//! change is applied. The buffer is a [`Rope`] so long runs of small edits
//! stay cheap.

use crate::config::PatchPolicy;
use crate::edit_log::Edit;
use crate::error::{HistoryError, Result};
use crate::models::ContentChange;
use ropey::Rope;

/// Apply one change to `buffer` in place.
///
/// # Arguments
/// - `buffer`: Current text.
/// - `change`: Replacement of `range_length` chars at `range_offset`.
/// - `policy`: What to do when the interval leaves the buffer.
///
/// # Errors
/// Returns [`HistoryError::MalformedPatch`] under [`PatchPolicy::Strict`] when
/// `range_offset` or `range_offset + range_length` exceeds the buffer length.
pub fn apply_change(buffer: &mut Rope, change: &ContentChange, policy: PatchPolicy) -> Result<()> {
    let buffer_len = buffer.len_chars();
    let (start, end) = match change.range_offset.checked_add(change.range_length) {
        Some(end) if end <= buffer_len => (change.range_offset, end),
        _ => match policy {
            PatchPolicy::Strict => {
                return Err(HistoryError::MalformedPatch {
                    offset: change.range_offset,
                    length: change.range_length,
                    buffer_len,
                });
            }
            PatchPolicy::Clamp => {
                let start = change.range_offset.min(buffer_len);
                let end = change.end_offset().min(buffer_len).max(start);
                tracing::warn!(
                    "Clamping change [{}, +{}) to [{}, {}) in a buffer of {} chars",
                    change.range_offset,
                    change.range_length,
                    start,
                    end,
                    buffer_len
                );
                (start, end)
            }
        },
    };
    if start < end {
        buffer.remove(start..end);
    }
    if !change.text.is_empty() {
        buffer.insert(start, &change.text);
    }
    Ok(())
}

/// Apply every change of `edit` in listed order.
pub fn apply_edit(buffer: &mut Rope, edit: &Edit, policy: PatchPolicy) -> Result<()> {
    for change in &edit.changes {
        apply_change(buffer, change, policy)?;
    }
    Ok(())
}

/// Replay `edits` in order on top of `base`.
///
/// # Returns
/// The resulting text.
///
/// # Errors
/// Propagates the first [`HistoryError::MalformedPatch`].
pub fn replay<'a>(
    base: &str,
    edits: impl IntoIterator<Item = &'a Edit>,
    policy: PatchPolicy,
) -> Result<String> {
    let mut buffer = Rope::from_str(base);
    for edit in edits {
        apply_edit(&mut buffer, edit, policy)?;
    }
    Ok(buffer.to_string())
}

/// String-level convenience for a single change.
pub fn apply_change_to_str(
    base: &str,
    change: &ContentChange,
    policy: PatchPolicy,
) -> Result<String> {
    let mut buffer = Rope::from_str(base);
    apply_change(&mut buffer, change, policy)?;
    Ok(buffer.to_string())
}
