//! 文件树数据模型
//!
//! Directories are lazily materialized: `children == None` means the listing
//! was never fetched, which is different from an empty directory.

use crate::kernel::services::ports::file::{compare_entries, DirEntry};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::path::{Component, Path, PathBuf};

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

#[derive(Debug, PartialEq, Eq)]
pub enum FileTreeError {
    NotADirectory(PathBuf),
    UnknownPath(PathBuf),
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::NotADirectory(p) => write!(f, "not a directory: {}", p.display()),
            FileTreeError::UnknownPath(p) => write!(f, "path not in tree: {}", p.display()),
        }
    }
}

impl std::error::Error for FileTreeError {}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: String,
    path: PathBuf,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
}

pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    id_by_path: FxHashMap<PathBuf, NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeRow {
    pub id: NodeId,
    pub depth: u16,
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_expanded: bool,
}

impl FileTree {
    pub fn new(root_path: PathBuf) -> Self {
        let name = root_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| root_path.to_string_lossy().to_string());

        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node {
            kind: NodeKind::Dir,
            name,
            path: root_path.clone(),
            parent: None,
            children: None,
        });

        let mut id_by_path = FxHashMap::default();
        id_by_path.insert(root_path, root);

        Self {
            arena,
            root,
            id_by_path,
        }
    }

    /// Builds a tree from a `dir -> entries` listing, materializing every
    /// directory the listing contains.
    pub fn from_listing(root_path: PathBuf, listing: &FxHashMap<PathBuf, Vec<DirEntry>>) -> Self {
        let mut tree = Self::new(root_path.clone());
        let mut stack = vec![root_path];
        while let Some(dir) = stack.pop() {
            let Some(entries) = listing.get(&dir) else {
                continue;
            };
            for entry in entries.iter().filter(|e| e.is_dir) {
                stack.push(entry.path.clone());
            }
            let _ = tree.replace_children(&dir, entries.clone());
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.id_by_path.get(path).copied()
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|n| n.kind == NodeKind::Dir)
    }

    pub fn is_materialized(&self, path: &Path) -> bool {
        self.find(path)
            .and_then(|id| self.arena.get(id))
            .is_some_and(|n| n.children.is_some())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.name.as_str())
    }

    pub fn path(&self, id: NodeId) -> Option<&Path> {
        self.arena.get(id).map(|n| n.path.as_path())
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.arena.get(id).and_then(|n| n.children.as_deref())
    }

    /// Replaces the cached children of `dir`; never appends.
    pub fn replace_children(
        &mut self,
        dir: &Path,
        mut entries: Vec<DirEntry>,
    ) -> Result<(), FileTreeError> {
        let id = self
            .find(dir)
            .ok_or_else(|| FileTreeError::UnknownPath(dir.to_path_buf()))?;
        if !self.is_dir(id) {
            return Err(FileTreeError::NotADirectory(dir.to_path_buf()));
        }

        self.remove_children(id);

        entries.sort_by(compare_entries);
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = if entry.is_dir {
                NodeKind::Dir
            } else {
                NodeKind::File
            };
            let child = self.arena.insert(Node {
                kind,
                name: entry.name,
                path: entry.path.clone(),
                parent: Some(id),
                children: None,
            });
            self.id_by_path.insert(entry.path, child);
            children.push(child);
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.children = Some(children);
        }
        Ok(())
    }

    /// Drops the cached children of `dir`, returning it to the unfetched state.
    pub fn clear_children(&mut self, dir: &Path) -> bool {
        let Some(id) = self.find(dir) else {
            return false;
        };
        let had_children = self.arena.get(id).is_some_and(|n| n.children.is_some());
        self.remove_children(id);
        had_children
    }

    fn remove_children(&mut self, id: NodeId) {
        let Some(children) = self.arena.get_mut(id).and_then(|n| n.children.take()) else {
            return;
        };
        let mut stack = children;
        while let Some(child) = stack.pop() {
            if let Some(node) = self.arena.remove(child) {
                self.id_by_path.remove(&node.path);
                if let Some(grandchildren) = node.children {
                    stack.extend(grandchildren);
                }
            }
        }
    }

    /// Visible rows below the root. The root is always expanded; other
    /// directories show their children only when listed in `expanded`.
    pub fn flatten(&self, expanded: &FxHashSet<PathBuf>) -> Vec<FileTreeRow> {
        let mut result = Vec::new();
        let mut stack: Vec<(NodeId, u16)> = Vec::new();

        if let Some(children) = self.children(self.root) {
            for &child in children.iter().rev() {
                stack.push((child, 0));
            }
        }

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            let is_dir = node.kind == NodeKind::Dir;
            let is_expanded = is_dir && expanded.contains(&node.path);
            result.push(FileTreeRow {
                id,
                depth,
                name: node.name.clone(),
                path: node.path.clone(),
                is_dir,
                is_expanded,
            });

            if is_expanded {
                if let Some(children) = &node.children {
                    for &child in children.iter().rev() {
                        stack.push((child, depth.saturating_add(1)));
                    }
                }
            }
        }

        result
    }
}

/// Names hidden from the tree and from watcher notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    names: FxHashSet<String>,
}

impl IgnoreRules {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_ignored_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.names.contains(name)
    }

    /// `relative` is a path below the watched root. Any segment may match an
    /// ignored name; the dot rule only applies to the final segment.
    pub fn is_ignored_path(&self, relative: &Path) -> bool {
        let segment_ignored = relative.components().any(|component| match component {
            Component::Normal(name) => self.names.contains(name.to_string_lossy().as_ref()),
            _ => false,
        });
        segment_ignored
            || relative
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'))
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new(["node_modules", "__pycache__", ".git"])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
