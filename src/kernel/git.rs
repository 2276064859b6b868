use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitStatusKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    Changed,
}

impl GitStatusKind {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Modified => "git-modified",
            Self::Added => "git-added",
            Self::Deleted => "git-deleted",
            Self::Renamed => "git-renamed",
            Self::Changed => "git-changed",
        }
    }
}

/// Path -> status snapshot for the open folder. Every ancestor directory of
/// a changed path, up to but excluding the root, is reported as modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOverlay {
    statuses: FxHashMap<PathBuf, GitStatusKind>,
}

impl GitOverlay {
    pub fn from_statuses<I>(root: &Path, statuses: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, GitStatusKind)>,
    {
        let mut map = FxHashMap::default();
        let mut changed = Vec::new();
        for (path, kind) in statuses {
            changed.push(path.clone());
            map.insert(path, kind);
        }

        for path in changed {
            if !path.starts_with(root) {
                continue;
            }
            let mut current = path.parent();
            while let Some(dir) = current {
                if dir == root || !dir.starts_with(root) {
                    break;
                }
                map.entry(dir.to_path_buf())
                    .or_insert(GitStatusKind::Modified);
                current = dir.parent();
            }
        }

        Self { statuses: map }
    }

    pub fn get(&self, path: &Path) -> Option<GitStatusKind> {
        self.statuses.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/git.rs"]
mod tests;
