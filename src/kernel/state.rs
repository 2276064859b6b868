use crate::kernel::documents::DocumentRegistry;
use crate::kernel::explorer::ExplorerState;
use crate::kernel::git::GitOverlay;
use crate::kernel::services::ports::{WindowId, WindowKind};
use std::path::PathBuf;

/// Everything one window knows: its folder session, its documents and the
/// projected tree.
pub struct AppState {
    pub window: WindowId,
    pub kind: WindowKind,
    pub folder: Option<PathBuf>,
    /// Latest folder open or close; older `FolderOpened` results are stale.
    pub folder_request: u64,
    pub documents: DocumentRegistry,
    pub explorer: ExplorerState,
    pub git: GitOverlay,
    pub last_error: Option<String>,
    /// Set between `RestoreSession` and `SessionRestored`.
    pub restoring: bool,
    pub saves_in_flight: usize,
}

impl AppState {
    pub fn new(window: WindowId, kind: WindowKind) -> Self {
        Self {
            window,
            kind,
            folder: None,
            folder_request: 0,
            documents: DocumentRegistry::new(),
            explorer: ExplorerState::new(),
            git: GitOverlay::default(),
            last_error: None,
            restoring: false,
            saves_in_flight: 0,
        }
    }

    /// Secondary windows never claim the persisted session.
    pub fn owns_session(&self) -> bool {
        self.kind == WindowKind::Primary
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
