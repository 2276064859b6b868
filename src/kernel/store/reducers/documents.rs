use crate::kernel::documents::DocumentId;
use crate::kernel::services::ports::FileError;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect};

impl Store {
    pub(in crate::kernel::store) fn reduce_document_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::NewDocument => {
                self.state
                    .documents
                    .create(self.engine.as_mut(), None, String::new(), None);
                let effects = self.persist_effect().into_iter().collect();
                DispatchResult::with_effects(effects, true)
            }
            Action::OpenFile(path) => {
                if let Some(id) = self.state.documents.find_by_path(&path) {
                    let changed = self.state.documents.activate(self.engine.as_mut(), id);
                    return DispatchResult::changed(changed);
                }
                DispatchResult::with_effects(vec![Effect::LoadFile(path)], false)
            }
            Action::OpenFileDialog => DispatchResult::with_effects(
                vec![Effect::ChooseOpenFile {
                    directory: self.state.folder.clone(),
                }],
                false,
            ),
            Action::FileLoaded { path, content } => {
                self.state
                    .documents
                    .create(self.engine.as_mut(), Some(path), content, None);
                self.refresh_rows();
                let effects = self.persist_effect().into_iter().collect();
                DispatchResult::with_effects(effects, true)
            }
            Action::FileLoadFailed { path, error } => {
                tracing::warn!(path = %path.display(), error = %error, "open failed");
                self.state.last_error = Some(error.to_string());
                DispatchResult::changed(true)
            }
            Action::Activate(id) => {
                DispatchResult::changed(self.state.documents.activate(self.engine.as_mut(), id))
            }
            Action::Edit { id, content } => {
                let was_dirty = self.is_dirty(id);
                let changed = self
                    .state
                    .documents
                    .set_content(self.engine.as_mut(), id, content);
                if changed && !was_dirty {
                    self.refresh_rows();
                }
                DispatchResult::changed(changed)
            }
            Action::MarkModified(id) => {
                let changed = self.state.documents.mark_modified(id);
                if changed {
                    self.refresh_rows();
                }
                DispatchResult::changed(changed)
            }
            Action::Close(id) => {
                if self
                    .state
                    .documents
                    .close(self.engine.as_mut(), id)
                    .is_none()
                {
                    return DispatchResult::none();
                }
                self.refresh_rows();
                let effects = self.persist_effect().into_iter().collect();
                DispatchResult::with_effects(effects, true)
            }
            Action::Save(id) => {
                self.sync_editor();
                let Some(doc) = self.state.documents.get(id) else {
                    return DispatchResult::none();
                };
                if doc.path().is_none() {
                    return DispatchResult::with_effects(vec![self.choose_save_path(id)], false);
                }
                match self.state.documents.begin_save(id) {
                    Some(request) => {
                        self.state.saves_in_flight += 1;
                        DispatchResult::with_effects(vec![Effect::WriteFile(request)], true)
                    }
                    None => DispatchResult::none(),
                }
            }
            Action::SaveAs(id) => {
                if self.state.documents.get(id).is_none() {
                    return DispatchResult::none();
                }
                DispatchResult::with_effects(vec![self.choose_save_path(id)], false)
            }
            Action::SavePathChosen { id, path } => {
                self.sync_editor();
                if self.state.documents.get(id).is_none() {
                    return DispatchResult::none();
                }
                // 另存为覆盖了已打开的文件：旧标签页让位
                if let Some(other) = self
                    .state
                    .documents
                    .find_by_path(&path)
                    .filter(|&other| other != id)
                {
                    let was_active = self.state.documents.active() == Some(other);
                    self.state.documents.close(self.engine.as_mut(), other);
                    if was_active {
                        self.state.documents.activate(self.engine.as_mut(), id);
                    }
                    tracing::info!(path = %path.display(), "save as replaced an open tab");
                }
                self.state.documents.set_path(id, path);
                let Some(request) = self.state.documents.begin_save(id) else {
                    return DispatchResult::none();
                };
                self.state.saves_in_flight += 1;
                let mut effects = vec![Effect::WriteFile(request)];
                effects.extend(self.persist_effect());
                DispatchResult::with_effects(effects, true)
            }
            Action::SaveAll => {
                self.sync_editor();
                let requests = self.state.documents.pending_saves();
                self.state.saves_in_flight += requests.len();
                let changed = !requests.is_empty();
                let effects = requests.into_iter().map(Effect::WriteFile).collect();
                DispatchResult::with_effects(effects, changed)
            }
            Action::SaveCompleted { request, result } => {
                self.state.saves_in_flight = self.state.saves_in_flight.saturating_sub(1);
                match result {
                    Ok(()) => {
                        if self.state.documents.complete_save(&request) {
                            self.refresh_rows();
                        }
                    }
                    Err(error) => {
                        tracing::warn!(
                            document = %request.id,
                            path = %request.path.display(),
                            error = %error,
                            "save failed"
                        );
                        self.state.last_error = Some(error.to_string());
                    }
                }
                DispatchResult::changed(true)
            }
            Action::DialogCancelled => {
                self.state.last_error = Some(FileError::Cancelled.to_string());
                DispatchResult::changed(true)
            }
            _ => DispatchResult::none(),
        }
    }

    fn is_dirty(&self, id: DocumentId) -> bool {
        self.state
            .documents
            .get(id)
            .is_some_and(|doc| doc.is_dirty())
    }

    fn choose_save_path(&self, id: DocumentId) -> Effect {
        let suggested_name = self
            .state
            .documents
            .get(id)
            .map(|doc| doc.name().to_string())
            .unwrap_or_default();
        let directory = self
            .state
            .documents
            .get(id)
            .and_then(|doc| doc.path())
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .or_else(|| self.state.folder.clone());
        Effect::ChooseSavePath {
            id,
            suggested_name,
            directory,
        }
    }
}
