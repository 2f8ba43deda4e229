//! Per-file, chronologically ordered incremental edits.

use crate::checkpoint::CheckpointId;
use crate::models::ContentChange;
use crate::time::Timestamp;

/// One recorded change event, anchored to the checkpoint current at the time.
///
/// `changes` apply in listed order; each sees the buffer as already modified
/// by the ones before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub file: String,
    pub time: Timestamp,
    pub base: CheckpointId,
    pub changes: Vec<ContentChange>,
}

/// Edits of one file sorted ascending by time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLog {
    edits: Vec<Edit>,
}

impl EditLog {
    /// Build a log, stably sorting by time so equal timestamps keep
    /// their input order.
    pub fn new(mut edits: Vec<Edit>) -> Self {
        edits.sort_by_key(|edit| edit.time);
        Self { edits }
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Edit> {
        self.edits.get(index)
    }

    pub fn last(&self) -> Option<&Edit> {
        self.edits.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    /// Longest prefix whose edits all happened at or before `time`.
    pub fn prefix_until(&self, time: Timestamp) -> &[Edit] {
        let end = self.edits.partition_point(|edit| edit.time <= time);
        &self.edits[..end]
    }
}

impl<'a> IntoIterator for &'a EditLog {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

/// Trailing run of `edits` sharing the last edit's anchor, in chronological
/// order.
///
/// Walks backward from the end and stops at the first edit anchored
/// elsewhere, so the cost is the length of the run, not of the history.
pub fn anchor_run(edits: &[Edit]) -> &[Edit] {
    let Some(last) = edits.last() else {
        return edits;
    };
    let start = edits
        .iter()
        .rposition(|edit| edit.base != last.base)
        .map_or(0, |index| index + 1);
    &edits[start..]
}
