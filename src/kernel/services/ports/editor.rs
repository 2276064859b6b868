//! Editor engine contract.
//!
//! The engine owns the text models; the kernel only holds their ids and
//! treats each model as an opaque content container.

use slotmap::new_key_type;

new_key_type! { pub struct ModelId; }

/// Cursor and scroll position saved when a document loses focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub cursor: usize,
    pub scroll_top: usize,
}

pub trait EditorEngine: Send {
    fn create_model(&mut self, content: &str, language: Option<&'static str>) -> ModelId;

    fn value(&self, model: ModelId) -> Option<String>;

    fn set_value(&mut self, model: ModelId, content: &str);

    fn dispose(&mut self, model: ModelId);

    /// Shows `model` in the editor surface, or nothing.
    fn set_model(&mut self, model: Option<ModelId>);

    fn save_view_state(&self) -> Option<ViewState>;

    fn restore_view_state(&mut self, state: ViewState);
}
