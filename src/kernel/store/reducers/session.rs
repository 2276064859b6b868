use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect};

impl Store {
    pub(in crate::kernel::store) fn reduce_session_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::RestoreSession(snapshot) => {
                if !self.state.owns_session() {
                    tracing::debug!(window = %self.state.window, "secondary window skips restore");
                    return DispatchResult::none();
                }
                if snapshot.is_empty() || self.state.restoring {
                    return DispatchResult::none();
                }
                self.state.restoring = true;
                let request = self.next_folder_request();
                DispatchResult::with_effects(vec![Effect::RestoreSession { request, snapshot }], true)
            }
            Action::SessionRestored {
                documents,
                active_path,
            } => {
                for doc in documents {
                    self.state.documents.create(
                        self.engine.as_mut(),
                        doc.path,
                        doc.content,
                        Some(doc.name),
                    );
                }
                if let Some(id) = active_path
                    .as_deref()
                    .and_then(|p| self.state.documents.find_by_path(p))
                {
                    self.state.documents.activate(self.engine.as_mut(), id);
                }

                self.state.restoring = false;
                self.refresh_rows();
                let effects = self.persist_effect().into_iter().collect();
                DispatchResult::with_effects(effects, true)
            }
            Action::PersistSession => {
                let effects = self.persist_effect().into_iter().collect();
                DispatchResult::with_effects(effects, false)
            }
            _ => DispatchResult::none(),
        }
    }
}
