//! 文件树投影
//!
//! At most one full render is in flight. Requests arriving meanwhile set a
//! single pending flag that becomes one follow-up render. Results carry the
//! generation they were requested under; a folder switch bumps it so late
//! results for the previous folder are dropped.

use crate::kernel::git::{GitOverlay, GitStatusKind};
use crate::kernel::services::ports::DirEntry;
use crate::models::FileTree;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Unsaved,
    Git(GitStatusKind),
}

impl Decoration {
    pub fn class_name(self) -> &'static str {
        match self {
            Decoration::Unsaved => "unsaved",
            Decoration::Git(kind) => kind.class_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerRow {
    pub path: PathBuf,
    pub name: String,
    pub depth: u16,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub decoration: Option<Decoration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub root: PathBuf,
    pub expanded: Vec<PathBuf>,
    pub generation: u64,
}

/// What finishing a render asks for next.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderFollowUp {
    pub render: Option<RenderRequest>,
    pub loads: Vec<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded { load: Option<PathBuf> },
    Collapsed,
    NotADirectory,
}

#[derive(Default)]
pub struct ExplorerState {
    root: Option<PathBuf>,
    tree: Option<FileTree>,
    expanded: FxHashSet<PathBuf>,
    rendering: bool,
    pending: bool,
    generation: u64,
    renders_completed: u64,
    rows: Vec<ExplorerRow>,
    error: Option<String>,
}

impl ExplorerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    pub fn rows(&self) -> &[ExplorerRow] {
        &self.rows
    }

    pub fn row(&self, path: &Path) -> Option<&ExplorerRow> {
        self.rows.iter().find(|r| r.path == path)
    }

    pub fn expanded(&self) -> &FxHashSet<PathBuf> {
        &self.expanded
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renders_completed(&self) -> u64 {
        self.renders_completed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switches to a new folder (or none). Expansion state belongs to the
    /// folder and is reset with it.
    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.generation += 1;
        self.tree = root.clone().map(FileTree::new);
        self.root = root;
        self.expanded.clear();
        self.rendering = false;
        self.pending = false;
        self.rows.clear();
        self.error = None;
    }

    pub fn request_render(&mut self) -> Option<RenderRequest> {
        let root = self.root.clone()?;
        if self.rendering {
            self.pending = true;
            return None;
        }
        self.rendering = true;
        let mut expanded: Vec<PathBuf> = self.expanded.iter().cloned().collect();
        expanded.sort();
        Some(RenderRequest {
            root,
            expanded,
            generation: self.generation,
        })
    }

    fn finish_render(&mut self) -> Option<RenderRequest> {
        self.rendering = false;
        self.renders_completed += 1;
        if self.pending {
            self.pending = false;
            return self.request_render();
        }
        None
    }

    /// Installs a full `dir -> entries` listing. Stale generations are
    /// ignored. Directories expanded while the render was running are loaded
    /// individually.
    pub fn apply_render(
        &mut self,
        generation: u64,
        listing: &FxHashMap<PathBuf, Vec<DirEntry>>,
    ) -> RenderFollowUp {
        if generation != self.generation {
            return RenderFollowUp::default();
        }
        let Some(root) = self.root.clone() else {
            return RenderFollowUp::default();
        };

        let tree = FileTree::from_listing(root, listing);
        let mut loads: Vec<PathBuf> = self
            .expanded
            .iter()
            .filter(|p| tree.find(p).is_some() && !tree.is_materialized(p))
            .cloned()
            .collect();
        loads.sort();
        self.tree = Some(tree);
        self.error = None;

        RenderFollowUp {
            render: self.finish_render(),
            loads,
        }
    }

    /// A failed render keeps the previous tree; only the root listing can
    /// fail a render.
    pub fn apply_render_error(&mut self, generation: u64, error: String) -> RenderFollowUp {
        if generation != self.generation {
            return RenderFollowUp::default();
        }
        self.error = Some(error);
        RenderFollowUp {
            render: self.finish_render(),
            loads: Vec::new(),
        }
    }

    /// Expands or collapses `path` in memory. First expansion of an
    /// unfetched directory asks for its listing; collapsing drops the cache.
    pub fn toggle(&mut self, path: &Path) -> ToggleOutcome {
        let Some(tree) = self.tree.as_mut() else {
            return ToggleOutcome::NotADirectory;
        };
        let Some(id) = tree.find(path) else {
            return ToggleOutcome::NotADirectory;
        };
        if !tree.is_dir(id) || id == tree.root() {
            return ToggleOutcome::NotADirectory;
        }

        if self.expanded.remove(path) {
            tree.clear_children(path);
            return ToggleOutcome::Collapsed;
        }

        self.expanded.insert(path.to_path_buf());
        let load = (!tree.is_materialized(path)).then(|| path.to_path_buf());
        ToggleOutcome::Expanded { load }
    }

    /// Installs the listing of one directory. Ignored when the folder
    /// changed or the directory was collapsed meanwhile. Returns nested
    /// directories that are expanded but still unfetched.
    pub fn apply_dir_loaded(
        &mut self,
        generation: u64,
        path: &Path,
        entries: Vec<DirEntry>,
    ) -> Option<Vec<PathBuf>> {
        if generation != self.generation || !self.expanded.contains(path) {
            return None;
        }
        let tree = self.tree.as_mut()?;
        tree.replace_children(path, entries).ok()?;

        let id = tree.find(path)?;
        let mut nested: Vec<PathBuf> = tree
            .children(id)
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| tree.path(child))
            .filter(|p| self.expanded.contains(*p))
            .map(Path::to_path_buf)
            .collect();
        nested.sort();
        Some(nested)
    }

    /// Recomputes visible rows. Unsaved wins over git status.
    pub fn rebuild_rows(&mut self, git: &GitOverlay, dirty: &FxHashSet<PathBuf>) {
        let Some(tree) = self.tree.as_ref() else {
            self.rows.clear();
            return;
        };
        self.rows = tree
            .flatten(&self.expanded)
            .into_iter()
            .map(|row| {
                let decoration = if !row.is_dir && dirty.contains(&row.path) {
                    Some(Decoration::Unsaved)
                } else {
                    git.get(&row.path).map(Decoration::Git)
                };
                ExplorerRow {
                    path: row.path,
                    name: row.name,
                    depth: row.depth,
                    is_dir: row.is_dir,
                    is_expanded: row.is_expanded,
                    decoration,
                }
            })
            .collect();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/explorer.rs"]
mod tests;
