//! Checkpoint store: append-only arena of snapshots and aliases for one file.

use crate::error::{HistoryError, Result};
use crate::time::Timestamp;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Index of a checkpoint inside its file's [`CheckpointStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckpointId(usize);

/// A point-in-time reference to full file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checkpoint {
    /// Owns the file text as of `mtime`.
    Snapshot { contents: String, mtime: Timestamp },
    /// File unchanged since `prev`; holds no text of its own.
    Alias { prev: CheckpointId, mtime: Timestamp },
}

impl Checkpoint {
    pub fn mtime(&self) -> Timestamp {
        match self {
            Self::Snapshot { mtime, .. } | Self::Alias { mtime, .. } => *mtime,
        }
    }
}

/// Text a checkpoint resolves to, borrowed from the terminal snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCheckpoint<'a> {
    pub contents: &'a str,
    /// Modification time of the terminal snapshot.
    pub mtime: Timestamp,
}

/// All checkpoints of one file, keyed by arena index and by mtime.
///
/// Aliases may only point at checkpoints registered before them, so every
/// `prev` index is strictly smaller than the alias's own index and chains
/// always end at a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
    checkpoints: Vec<Checkpoint>,
    by_mtime: BTreeMap<Timestamp, CheckpointId>,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            checkpoints: Vec::new(),
            by_mtime: BTreeMap::new(),
        }
    }

    /// File this store belongs to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a snapshot that owns `contents`.
    ///
    /// # Errors
    /// Returns [`HistoryError::DuplicateCheckpoint`] when `mtime` is taken.
    pub fn register_snapshot(
        &mut self,
        contents: impl Into<String>,
        mtime: Timestamp,
    ) -> Result<CheckpointId> {
        self.push(Checkpoint::Snapshot {
            contents: contents.into(),
            mtime,
        })
    }

    /// Register an alias of the checkpoint recorded at `prev_mtime`.
    ///
    /// # Errors
    /// - [`HistoryError::DanglingCheckpointReference`] if nothing was
    ///   registered at `prev_mtime`.
    /// - [`HistoryError::CheckpointOrder`] if `prev_mtime >= mtime`.
    /// - [`HistoryError::DuplicateCheckpoint`] when `mtime` is taken.
    pub fn register_alias(
        &mut self,
        prev_mtime: Timestamp,
        mtime: Timestamp,
    ) -> Result<CheckpointId> {
        let Some(prev) = self.lookup(prev_mtime) else {
            return Err(HistoryError::DanglingCheckpointReference {
                path: self.path.clone(),
                prev: prev_mtime,
                mtime,
            });
        };
        if prev_mtime >= mtime {
            return Err(HistoryError::CheckpointOrder {
                path: self.path.clone(),
                prev: prev_mtime,
                mtime,
            });
        }
        self.push(Checkpoint::Alias { prev, mtime })
    }

    fn push(&mut self, checkpoint: Checkpoint) -> Result<CheckpointId> {
        let mtime = checkpoint.mtime();
        if self.by_mtime.contains_key(&mtime) {
            return Err(HistoryError::DuplicateCheckpoint {
                path: self.path.clone(),
                mtime,
            });
        }
        let id = CheckpointId(self.checkpoints.len());
        self.checkpoints.push(checkpoint);
        self.by_mtime.insert(mtime, id);
        Ok(id)
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.get(id.0)
    }

    /// Checkpoint registered at exactly `mtime`.
    pub fn lookup(&self, mtime: Timestamp) -> Option<CheckpointId> {
        self.by_mtime.get(&mtime).copied()
    }

    /// Most recently registered checkpoint.
    pub fn last(&self) -> Option<CheckpointId> {
        self.checkpoints.len().checked_sub(1).map(CheckpointId)
    }

    pub fn mtime_of(&self, id: CheckpointId) -> Option<Timestamp> {
        self.get(id).map(Checkpoint::mtime)
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Checkpoints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckpointId, &Checkpoint)> {
        self.checkpoints
            .iter()
            .enumerate()
            .map(|(index, checkpoint)| (CheckpointId(index), checkpoint))
    }

    /// Follow alias links until a snapshot is reached.
    ///
    /// The walk is a loop bounded by the arena size, so arbitrarily long
    /// alias chains never grow the stack.
    ///
    /// # Errors
    /// Returns [`HistoryError::NotFound`] if `id` does not belong to this
    /// store, or [`HistoryError::DanglingCheckpointReference`] if a chain
    /// fails to terminate.
    pub fn resolve(&self, id: CheckpointId) -> Result<ResolvedCheckpoint<'_>> {
        self.walk(id).map(|(resolved, _)| resolved)
    }

    /// Number of alias hops between `id` and its snapshot.
    pub fn chain_len(&self, id: CheckpointId) -> Result<usize> {
        self.walk(id).map(|(_, hops)| hops)
    }

    fn walk(&self, id: CheckpointId) -> Result<(ResolvedCheckpoint<'_>, usize)> {
        let mut current = id;
        for hops in 0..=self.checkpoints.len() {
            match self.get(current) {
                Some(Checkpoint::Snapshot { contents, mtime }) => {
                    return Ok((
                        ResolvedCheckpoint {
                            contents,
                            mtime: *mtime,
                        },
                        hops,
                    ));
                }
                Some(Checkpoint::Alias { prev, .. }) => current = *prev,
                None if hops == 0 => return Err(HistoryError::NotFound(self.path.clone())),
                None => break,
            }
        }
        let origin = self.mtime_of(id).unwrap_or(Timestamp::MIN);
        Err(HistoryError::DanglingCheckpointReference {
            path: self.path.clone(),
            prev: self.mtime_of(current).unwrap_or(Timestamp::MIN),
            mtime: origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn snapshot_resolves_to_itself() {
        let mut store = CheckpointStore::new("a.txt");
        let id = store.register_snapshot("hello", ts(1)).expect("snapshot");
        let resolved = store.resolve(id).expect("resolve");
        assert_eq!(resolved.contents, "hello");
        assert_eq!(resolved.mtime, ts(1));
        assert_eq!(store.chain_len(id).expect("hops"), 0);
    }

    #[test]
    fn alias_chain_resolves_to_terminal_snapshot() {
        let mut store = CheckpointStore::new("a.txt");
        let root = store.register_snapshot("base", ts(10)).expect("snapshot");
        let mut previous = root;
        let mut previous_mtime = ts(10);
        for step in 1..=50 {
            let mtime = ts(10 + step);
            let alias = store.register_alias(previous_mtime, mtime).expect("alias");
            assert_eq!(
                store.resolve(alias).expect("alias").contents,
                store.resolve(previous).expect("prev").contents
            );
            previous = alias;
            previous_mtime = mtime;
        }
        assert_eq!(store.chain_len(previous).expect("hops"), 50);
        assert_eq!(store.resolve(previous).expect("resolve").mtime, ts(10));
        assert_eq!(store.last(), Some(previous));
    }

    #[test]
    fn alias_to_unregistered_checkpoint_is_dangling() {
        let mut store = CheckpointStore::new("a.txt");
        store.register_snapshot("base", ts(10)).expect("snapshot");
        let err = store.register_alias(ts(5), ts(20)).expect_err("dangling");
        assert!(
            matches!(err, HistoryError::DanglingCheckpointReference { prev, mtime, .. }
                if prev == ts(5) && mtime == ts(20)),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn alias_must_be_newer_than_prev() {
        let mut store = CheckpointStore::new("a.txt");
        store.register_snapshot("base", ts(10)).expect("snapshot");
        let err = store.register_alias(ts(10), ts(10)).expect_err("order");
        assert!(matches!(err, HistoryError::CheckpointOrder { .. }));
    }

    #[test]
    fn duplicate_mtime_is_rejected() {
        let mut store = CheckpointStore::new("a.txt");
        store.register_snapshot("one", ts(10)).expect("snapshot");
        let err = store.register_snapshot("two", ts(10)).expect_err("duplicate");
        assert!(matches!(err, HistoryError::DuplicateCheckpoint { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn foreign_id_is_not_found() {
        let mut other = CheckpointStore::new("b.txt");
        other.register_snapshot("x", ts(1)).expect("snapshot");
        let foreign = other.register_snapshot("y", ts(2)).expect("snapshot");
        let store = CheckpointStore::new("a.txt");
        assert!(matches!(store.resolve(foreign), Err(HistoryError::NotFound(_))));
    }
}
