//! Directory tree over archive paths for direct per-file lookups.

use crate::error::{HistoryError, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Child of a [`PathTree`] directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Dir(PathTree),
    /// Leaf holding the full archive path of the entry.
    File(PathBuf),
}

/// One directory level of archive paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTree {
    part: String,
    children: BTreeMap<String, PathNode>,
}

fn parts(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

impl PathTree {
    pub fn new(part: impl Into<String>) -> Self {
        Self {
            part: part.into(),
            children: BTreeMap::new(),
        }
    }

    /// Build a tree rooted at `.` holding every path as a leaf.
    pub fn build<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut root = Self::new(".");
        for path in paths {
            root.put(path);
        }
        root
    }

    /// Name of this directory level.
    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn children(&self) -> &BTreeMap<String, PathNode> {
        &self.children
    }

    /// Names of direct children.
    pub fn iterdir(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Leaf paths directly inside this directory.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.children.values().filter_map(|node| match node {
            PathNode::File(path) => Some(path.as_path()),
            PathNode::Dir(_) => None,
        })
    }

    /// Insert `path` as a leaf, creating intermediate directories.
    ///
    /// A path that would descend through an existing leaf is ignored.
    pub fn put(&mut self, path: &Path) {
        let parts = parts(path);
        let Some((leaf, dirs)) = parts.split_last() else {
            return;
        };
        let mut current = self;
        for part in dirs {
            let node = current
                .children
                .entry(part.clone())
                .or_insert_with(|| PathNode::Dir(PathTree::new(part.clone())));
            match node {
                PathNode::Dir(dir) => current = dir,
                PathNode::File(existing) => {
                    tracing::trace!(
                        "Ignoring {}: {} is already a file",
                        path.display(),
                        existing.display()
                    );
                    return;
                }
            }
        }
        current
            .children
            .entry(leaf.clone())
            .or_insert_with(|| PathNode::File(path.to_path_buf()));
    }

    /// Directory at `path` relative to this one; the empty path is `self`.
    pub fn find_dir(&self, path: &Path) -> Option<&PathTree> {
        let mut current = self;
        for part in parts(path) {
            match current.children.get(&part)? {
                PathNode::Dir(dir) => current = dir,
                PathNode::File(_) => return None,
            }
        }
        Some(current)
    }

    /// Node at `path` relative to this directory.
    pub fn find(&self, path: &Path) -> Option<&PathNode> {
        let parts = parts(path);
        let (leaf, dirs) = parts.split_last()?;
        let parent: PathBuf = dirs.iter().collect();
        self.find_dir(&parent)?.children.get(leaf)
    }

    /// Like [`PathTree::find_dir`] but reports a miss as an error.
    ///
    /// # Errors
    /// Returns [`HistoryError::NotFound`] when `path` is absent or a file.
    pub fn get_dir(&self, path: &Path) -> Result<&PathTree> {
        self.find_dir(path)
            .ok_or_else(|| HistoryError::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_no_children() {
        let tree = PathTree::build(std::iter::empty::<&Path>());
        assert_eq!(tree, PathTree::new("."));
        assert_eq!(tree.iterdir().count(), 0);
    }

    #[test]
    fn builds_nested_directories() {
        let paths = ["a/b/c.txt", "a/b/d.txt", "a/e/f.txt", "g/h.txt"].map(PathBuf::from);
        let tree = PathTree::build(paths.iter().map(PathBuf::as_path));

        let a_dir = tree.get_dir(Path::new("a")).expect("a");
        assert_eq!(a_dir.iterdir().collect::<Vec<_>>(), vec!["b", "e"]);
        assert_eq!(a_dir.part(), "a");

        let b_dir = tree.get_dir(Path::new("a/b")).expect("a/b");
        assert!(std::ptr::eq(b_dir, a_dir.get_dir(Path::new("b")).expect("b")));
        assert_eq!(
            b_dir.files().collect::<Vec<_>>(),
            vec![Path::new("a/b/c.txt"), Path::new("a/b/d.txt")]
        );
        assert!(std::ptr::eq(tree.get_dir(Path::new("")).expect("root"), &tree));
    }

    #[test]
    fn lookups_distinguish_files_and_directories() {
        let tree = PathTree::build([Path::new("g/h.txt")]);
        assert!(matches!(tree.find(Path::new("g/h.txt")), Some(PathNode::File(_))));
        assert!(matches!(tree.find(Path::new("g")), Some(PathNode::Dir(_))));
        assert!(tree.find(Path::new("g/missing")).is_none());
        assert!(matches!(
            tree.get_dir(Path::new("g/h.txt")),
            Err(HistoryError::NotFound(_))
        ));
    }

    #[test]
    fn put_ignores_paths_through_existing_files() {
        let mut tree = PathTree::build([Path::new("a/b")]);
        tree.put(Path::new("a/b/c"));
        assert!(matches!(tree.find(Path::new("a/b")), Some(PathNode::File(_))));
        assert!(tree.find_dir(Path::new("a/b")).is_none());
    }
}
