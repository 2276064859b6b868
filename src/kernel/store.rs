use super::services::ports::EditorEngine;
use super::session::{SessionSnapshot, SessionTab};
use super::{Action, AppState, Effect};

mod reducers;

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    pub(crate) fn with_effects(effects: Vec<Effect>, state_changed: bool) -> Self {
        Self {
            effects,
            state_changed,
        }
    }
}

pub struct Store {
    state: AppState,
    engine: Box<dyn EditorEngine>,
}

impl Store {
    pub fn new(state: AppState, engine: Box<dyn EditorEngine>) -> Self {
        Self { state, engine }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn engine(&self) -> &dyn EditorEngine {
        self.engine.as_ref()
    }

    /// Direct access for the view layer (cursor moves, typing). Text changes
    /// made here are picked up on the next activation, save or snapshot.
    pub fn engine_mut(&mut self) -> &mut dyn EditorEngine {
        self.engine.as_mut()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Tick => DispatchResult::none(),
            Action::ClearError => DispatchResult::changed(self.state.last_error.take().is_some()),

            action @ (Action::RestoreSession(_)
            | Action::SessionRestored { .. }
            | Action::PersistSession) => self.reduce_session_action(action),

            action @ (Action::OpenFolder(_)
            | Action::OpenFolderDialog
            | Action::FolderOpened { .. }
            | Action::FolderOpenFailed { .. }
            | Action::CloseFolder
            | Action::FolderChanged(_)
            | Action::RefreshTree
            | Action::TreeRendered { .. }
            | Action::ToggleDirectory(_)
            | Action::DirLoaded { .. }
            | Action::GitStatusLoaded { .. }) => self.reduce_explorer_action(action),

            action => self.reduce_document_action(action),
        }
    }

    /// Pulls live editor text into the active document.
    pub fn sync_editor(&mut self) -> bool {
        let changed = self.state.documents.sync_active(self.engine.as_ref());
        if changed {
            self.refresh_rows();
        }
        changed
    }

    /// Folder, every tab with its live content, and the active tab's path.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        self.sync_editor();
        let documents = &self.state.documents;
        SessionSnapshot {
            open_folder: self.state.folder.clone(),
            tabs: documents
                .iter()
                .map(|doc| SessionTab {
                    path: doc.path().map(|p| p.to_path_buf()),
                    content: doc.content().to_string(),
                    name: doc.name().to_string(),
                })
                .collect(),
            active_tab_path: documents
                .active_document()
                .and_then(|doc| doc.path())
                .map(|p| p.to_path_buf()),
        }
    }

    fn next_folder_request(&mut self) -> u64 {
        self.state.folder_request += 1;
        self.state.folder_request
    }

    fn refresh_rows(&mut self) {
        let dirty = self.state.documents.dirty_paths();
        self.state.explorer.rebuild_rows(&self.state.git, &dirty);
    }

    /// Persistence request after a structural change, unless this window
    /// does not own the session or a restore is still running.
    fn persist_effect(&mut self) -> Option<Effect> {
        if !self.state.owns_session() || self.state.restoring {
            return None;
        }
        Some(Effect::PersistSession(self.snapshot()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
