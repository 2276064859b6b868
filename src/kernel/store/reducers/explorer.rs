use crate::kernel::explorer::{RenderFollowUp, ToggleOutcome};
use crate::kernel::git::GitOverlay;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect};

impl Store {
    pub(in crate::kernel::store) fn reduce_explorer_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenFolder(path) => {
                let request = self.next_folder_request();
                DispatchResult::with_effects(vec![Effect::OpenFolder { request, path }], false)
            }
            Action::OpenFolderDialog => {
                DispatchResult::with_effects(vec![Effect::ChooseOpenFolder], false)
            }
            Action::FolderOpened { request, root } => {
                if request != self.state.folder_request {
                    tracing::debug!(request, root = %root.display(), "stale folder open dropped");
                    return DispatchResult::none();
                }
                let closed = self
                    .state
                    .documents
                    .close_outside(self.engine.as_mut(), &root);
                if !closed.is_empty() {
                    tracing::info!(count = closed.len(), root = %root.display(), "closed tabs outside folder");
                }

                self.state.folder = Some(root.clone());
                self.state.git = GitOverlay::default();
                self.state.explorer.set_root(Some(root.clone()));

                let mut effects = Vec::new();
                effects.extend(self.state.explorer.request_render().map(Effect::RenderTree));
                effects.push(Effect::RefreshGit {
                    generation: self.state.explorer.generation(),
                    root,
                });
                effects.extend(self.persist_effect());
                DispatchResult::with_effects(effects, true)
            }
            Action::FolderOpenFailed {
                request,
                path,
                error,
            } => {
                if request != self.state.folder_request {
                    return DispatchResult::none();
                }
                tracing::warn!(path = %path.display(), error = %error, "open folder failed");
                self.state.last_error = Some(error.to_string());
                DispatchResult::changed(true)
            }
            Action::CloseFolder => {
                self.next_folder_request();
                if self.state.folder.take().is_none() {
                    return DispatchResult::none();
                }
                self.state.git = GitOverlay::default();
                self.state.explorer.set_root(None);
                let mut effects = vec![Effect::CloseFolder];
                effects.extend(self.persist_effect());
                DispatchResult::with_effects(effects, true)
            }
            Action::FolderChanged(change) => {
                let Some(root) = self.state.folder.clone() else {
                    return DispatchResult::none();
                };
                tracing::debug!(?change, "folder changed");
                let mut effects = Vec::new();
                effects.extend(self.state.explorer.request_render().map(Effect::RenderTree));
                effects.push(Effect::RefreshGit {
                    generation: self.state.explorer.generation(),
                    root,
                });
                DispatchResult::with_effects(effects, false)
            }
            Action::RefreshTree => {
                let effects = self
                    .state
                    .explorer
                    .request_render()
                    .map(Effect::RenderTree)
                    .into_iter()
                    .collect();
                DispatchResult::with_effects(effects, false)
            }
            Action::TreeRendered { generation, result } => {
                let follow = match result {
                    Ok(listing) => self.state.explorer.apply_render(generation, &listing),
                    Err(error) => {
                        tracing::warn!(error = %error, "tree render failed");
                        self.state
                            .explorer
                            .apply_render_error(generation, error.to_string())
                    }
                };
                self.refresh_rows();
                DispatchResult::with_effects(self.follow_up_effects(follow), true)
            }
            Action::ToggleDirectory(path) => match self.state.explorer.toggle(&path) {
                ToggleOutcome::NotADirectory => DispatchResult::none(),
                ToggleOutcome::Collapsed => {
                    self.refresh_rows();
                    DispatchResult::changed(true)
                }
                ToggleOutcome::Expanded { load } => {
                    self.refresh_rows();
                    let generation = self.state.explorer.generation();
                    let effects = load
                        .map(|path| Effect::LoadDir { generation, path })
                        .into_iter()
                        .collect();
                    DispatchResult::with_effects(effects, true)
                }
            },
            Action::DirLoaded {
                generation,
                path,
                result,
            } => match result {
                Ok(entries) => {
                    let Some(nested) = self
                        .state
                        .explorer
                        .apply_dir_loaded(generation, &path, entries)
                    else {
                        return DispatchResult::none();
                    };
                    self.refresh_rows();
                    let effects = nested
                        .into_iter()
                        .map(|path| Effect::LoadDir { generation, path })
                        .collect();
                    DispatchResult::with_effects(effects, true)
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %error, "directory listing failed");
                    DispatchResult::none()
                }
            },
            Action::GitStatusLoaded {
                generation,
                statuses,
            } => {
                if generation != self.state.explorer.generation() {
                    return DispatchResult::none();
                }
                let Some(root) = self.state.folder.as_deref() else {
                    return DispatchResult::none();
                };
                let overlay = GitOverlay::from_statuses(root, statuses);
                if overlay == self.state.git {
                    return DispatchResult::none();
                }
                self.state.git = overlay;
                self.refresh_rows();
                DispatchResult::changed(true)
            }
            _ => DispatchResult::none(),
        }
    }

    fn follow_up_effects(&self, follow: RenderFollowUp) -> Vec<Effect> {
        let generation = self.state.explorer.generation();
        follow
            .render
            .map(Effect::RenderTree)
            .into_iter()
            .chain(
                follow
                    .loads
                    .into_iter()
                    .map(|path| Effect::LoadDir { generation, path }),
            )
            .collect()
    }
}
