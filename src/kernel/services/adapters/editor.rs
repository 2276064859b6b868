//! 内置编辑器引擎：基于 ropey 的文本模型
//!
//! Stands in for the embedded editor. Each model is a rope plus the view
//! state last shown for it; exactly one model is attached to the view.

use crate::kernel::services::ports::{EditorEngine, ModelId, ViewState};
use ropey::Rope;
use slotmap::SlotMap;

struct RopeModel {
    rope: Rope,
    language: Option<&'static str>,
    view: ViewState,
}

#[derive(Default)]
pub struct RopeEngine {
    models: SlotMap<ModelId, RopeModel>,
    active: Option<ModelId>,
}

impl RopeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn active_model(&self) -> Option<ModelId> {
        self.active
    }

    pub fn language(&self, model: ModelId) -> Option<&'static str> {
        self.models.get(model).and_then(|m| m.language)
    }

    /// Moves the cursor of the attached model, clamped to its length.
    pub fn set_cursor(&mut self, cursor: usize, scroll_top: usize) {
        let Some(model) = self.active.and_then(|id| self.models.get_mut(id)) else {
            return;
        };
        model.view = ViewState {
            cursor: cursor.min(model.rope.len_chars()),
            scroll_top: scroll_top.min(model.rope.len_lines().saturating_sub(1)),
        };
    }
}

impl EditorEngine for RopeEngine {
    fn create_model(&mut self, content: &str, language: Option<&'static str>) -> ModelId {
        self.models.insert(RopeModel {
            rope: Rope::from_str(content),
            language,
            view: ViewState::default(),
        })
    }

    fn value(&self, model: ModelId) -> Option<String> {
        self.models.get(model).map(|m| m.rope.to_string())
    }

    fn set_value(&mut self, model: ModelId, content: &str) {
        if let Some(m) = self.models.get_mut(model) {
            m.rope = Rope::from_str(content);
            m.view.cursor = m.view.cursor.min(m.rope.len_chars());
        }
    }

    fn dispose(&mut self, model: ModelId) {
        if self.models.remove(model).is_some() && self.active == Some(model) {
            self.active = None;
        }
    }

    fn set_model(&mut self, model: Option<ModelId>) {
        self.active = model.filter(|id| self.models.contains_key(*id));
    }

    fn save_view_state(&self) -> Option<ViewState> {
        self.active
            .and_then(|id| self.models.get(id))
            .map(|m| m.view)
    }

    fn restore_view_state(&mut self, state: ViewState) {
        if let Some(m) = self.active.and_then(|id| self.models.get_mut(id)) {
            m.view = ViewState {
                cursor: state.cursor.min(m.rope.len_chars()),
                scroll_top: state.scroll_top,
            };
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/editor.rs"]
mod tests;
