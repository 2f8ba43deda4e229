//! Version resolver: point-in-time reconstruction of a single file.
//!
//! A query at time `t` takes every edit recorded at or before `t`, keeps only
//! the trailing run that shares the newest edit's anchor checkpoint, and
//! replays that run onto the anchor's resolved text. A newer snapshot
//! compacts everything before it, so older edits never need replaying.

use crate::checkpoint::CheckpointId;
use crate::config::PatchPolicy;
use crate::edit_log::{anchor_run, Edit};
use crate::error::Result;
use crate::history::FileChangeHistory;
use crate::patch;
use crate::time::Timestamp;

/// Anchor checkpoint plus the edits to replay on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayPlan<'a> {
    pub anchor: CheckpointId,
    /// Chronological; empty when no edit precedes the query time.
    pub edits: &'a [Edit],
}

impl FileChangeHistory {
    /// Work needed to reconstruct this file as of `time`.
    ///
    /// When no edit happened at or before `time`, the plan is the newest
    /// checkpoint known at load time with nothing to replay. That fallback
    /// ignores `time` entirely, so a query earlier than the first edit
    /// returns the latest snapshot rather than the original contents.
    pub fn replay_plan(&self, time: Timestamp) -> ReplayPlan<'_> {
        let prefix = self.edits().prefix_until(time);
        match prefix.last() {
            None => ReplayPlan {
                anchor: self.last_checkpoint(),
                edits: &[],
            },
            Some(last) => ReplayPlan {
                anchor: last.base,
                edits: anchor_run(prefix),
            },
        }
    }
}

/// Reconstructs file text under a fixed patch policy.
///
/// Holds no state besides the policy; every query is a pure function of the
/// history it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    policy: PatchPolicy,
}

impl Resolver {
    pub fn new(policy: PatchPolicy) -> Self {
        Self { policy }
    }

    /// Text of `file` as of `time`.
    ///
    /// # Errors
    /// Returns [`crate::HistoryError::MalformedPatch`] when a replayed change
    /// does not fit the buffer under a strict policy.
    pub fn version_at_time(&self, file: &FileChangeHistory, time: Timestamp) -> Result<String> {
        let plan = file.replay_plan(time);
        let base = file.checkpoints().resolve(plan.anchor)?;
        tracing::trace!(
            "Replaying {} edit(s) of {} onto checkpoint {}",
            plan.edits.len(),
            file.path().display(),
            base.mtime
        );
        if plan.edits.is_empty() {
            return Ok(base.contents.to_string());
        }
        patch::replay(base.contents, plan.edits, self.policy)
    }

    /// Text of `file` after its final recorded edit.
    pub fn latest_version(&self, file: &FileChangeHistory) -> Result<String> {
        self.version_at_time(file, Timestamp::MAX)
    }
}
