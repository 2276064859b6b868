//! 标签页/文档注册表
//!
//! Owns the ordered list of open documents and the active one. Each document
//! holds exactly one editor model; the registry is the only place that
//! creates or disposes models.

use crate::kernel::language::language_hint;
use crate::kernel::services::ports::{EditorEngine, ModelId, ViewState};
use rustc_hash::FxHashSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    name: String,
    path: Option<PathBuf>,
    content: String,
    saved_content: String,
    dirty: bool,
    version: u64,
    model: ModelId,
    view_state: Option<ViewState>,
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn saved_content(&self) -> &str {
        &self.saved_content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn view_state(&self) -> Option<ViewState> {
        self.view_state
    }
}

/// Content captured for one write. `version` is the edit version the
/// content belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: DocumentId,
    pub path: PathBuf,
    pub content: String,
    pub version: u64,
}

#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u64,
    untitled_seq: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    pub fn active(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.path.as_deref() == Some(path))
            .map(|d| d.id)
    }

    pub fn dirty_count(&self) -> usize {
        self.documents.iter().filter(|d| d.dirty).count()
    }

    pub fn dirty_paths(&self) -> FxHashSet<PathBuf> {
        self.documents
            .iter()
            .filter(|d| d.dirty)
            .filter_map(|d| d.path.clone())
            .collect()
    }

    /// Opens a document and activates it. An already open `path` is only
    /// activated. Untitled buffers start from an empty saved snapshot, so a
    /// restored buffer with content comes back dirty.
    pub fn create(
        &mut self,
        engine: &mut dyn EditorEngine,
        path: Option<PathBuf>,
        content: String,
        name: Option<String>,
    ) -> DocumentId {
        if let Some(existing) = path.as_deref().and_then(|p| self.find_by_path(p)) {
            self.activate(engine, existing);
            return existing;
        }

        self.next_id += 1;
        let id = DocumentId(self.next_id);
        let name = match (&path, name) {
            (Some(p), _) => p
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| p.to_string_lossy().to_string()),
            (None, Some(name)) if !name.is_empty() => name,
            (None, _) => self.next_untitled_name(),
        };

        let model = engine.create_model(&content, language_hint(path.as_deref()));
        let saved_content = if path.is_some() {
            content.clone()
        } else {
            String::new()
        };
        let dirty = content != saved_content;

        self.documents.push(Document {
            id,
            name,
            path,
            content,
            saved_content,
            dirty,
            version: 0,
            model,
            view_state: None,
        });
        self.activate(engine, id);
        id
    }

    fn next_untitled_name(&mut self) -> String {
        self.untitled_seq += 1;
        format!("Untitled-{}", self.untitled_seq)
    }

    /// Switches the active document. The outgoing document keeps its live
    /// content and view state. Unknown ids are ignored.
    pub fn activate(&mut self, engine: &mut dyn EditorEngine, id: DocumentId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        if self.active == Some(id) {
            return false;
        }

        if let Some(current) = self.active {
            self.sync_from_engine(engine, current);
            let view = engine.save_view_state();
            if let Some(doc) = self.get_mut(current) {
                doc.view_state = view;
            }
        }

        self.attach(engine, id);
        true
    }

    fn attach(&mut self, engine: &mut dyn EditorEngine, id: DocumentId) {
        self.active = Some(id);
        let Some(doc) = self.get(id) else {
            engine.set_model(None);
            return;
        };
        let (model, view) = (doc.model, doc.view_state);
        engine.set_model(Some(model));
        if let Some(view) = view {
            engine.restore_view_state(view);
        }
    }

    /// Releases the document's model. Closing the active document activates
    /// its neighbour at the same index, or the new last one.
    pub fn close(&mut self, engine: &mut dyn EditorEngine, id: DocumentId) -> Option<Document> {
        let index = self.index_of(id)?;
        let doc = self.documents.remove(index);
        engine.dispose(doc.model);

        if self.active == Some(id) {
            self.active = None;
            if self.documents.is_empty() {
                engine.set_model(None);
            } else {
                let next = self.documents[index.min(self.documents.len() - 1)].id;
                self.attach(engine, next);
            }
        }
        Some(doc)
    }

    /// Closes every document not stored under `root`, untitled ones included.
    pub fn close_outside(&mut self, engine: &mut dyn EditorEngine, root: &Path) -> Vec<DocumentId> {
        let doomed: Vec<DocumentId> = self
            .documents
            .iter()
            .filter(|d| !d.path.as_deref().is_some_and(|p| p.starts_with(root)))
            .map(|d| d.id)
            .collect();
        for &id in &doomed {
            self.close(engine, id);
        }
        doomed
    }

    /// Idempotent.
    pub fn mark_modified(&mut self, id: DocumentId) -> bool {
        match self.get_mut(id) {
            Some(doc) if !doc.dirty => {
                doc.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Replaces the document text from an edit. Returns whether anything
    /// changed.
    pub fn set_content(
        &mut self,
        engine: &mut dyn EditorEngine,
        id: DocumentId,
        content: String,
    ) -> bool {
        let Some(doc) = self.get_mut(id) else {
            return false;
        };
        if doc.content == content {
            return false;
        }
        engine.set_value(doc.model, &content);
        doc.content = content;
        doc.version += 1;
        doc.dirty = true;
        true
    }

    /// Pulls the live model text of the active document into its mirror.
    pub fn sync_active(&mut self, engine: &dyn EditorEngine) -> bool {
        match self.active {
            Some(id) => self.sync_from_engine(engine, id),
            None => false,
        }
    }

    fn sync_from_engine(&mut self, engine: &dyn EditorEngine, id: DocumentId) -> bool {
        let Some(doc) = self.get_mut(id) else {
            return false;
        };
        let Some(live) = engine.value(doc.model) else {
            return false;
        };
        if live == doc.content {
            return false;
        }
        doc.content = live;
        doc.version += 1;
        doc.dirty = true;
        true
    }

    /// Captures the write for a document that already has a path.
    pub fn begin_save(&self, id: DocumentId) -> Option<SaveRequest> {
        let doc = self.get(id)?;
        let path = doc.path.clone()?;
        Some(SaveRequest {
            id,
            path,
            content: doc.content.clone(),
            version: doc.version,
        })
    }

    /// Save-as: the only way a document's path changes once set. Refused
    /// while another document holds `path`.
    pub fn set_path(&mut self, id: DocumentId, path: PathBuf) -> bool {
        if self.find_by_path(&path).is_some_and(|holder| holder != id) {
            return false;
        }
        let Some(doc) = self.get_mut(id) else {
            return false;
        };
        if doc.path.as_deref() == Some(path.as_path()) {
            return false;
        }
        if let Some(name) = path.file_name() {
            doc.name = name.to_string_lossy().to_string();
        }
        doc.path = Some(path);
        true
    }

    /// Records a successful write. Dirty clears only when the write targeted
    /// the current path and no edit landed while it was in flight.
    pub fn complete_save(&mut self, request: &SaveRequest) -> bool {
        let Some(doc) = self.get_mut(request.id) else {
            return false;
        };
        if doc.path.as_deref() != Some(request.path.as_path()) {
            return false;
        }
        doc.saved_content = request.content.clone();
        if doc.version == request.version && doc.dirty {
            doc.dirty = false;
            return true;
        }
        false
    }

    /// Writes for every dirty document that has a path, in list order.
    pub fn pending_saves(&self) -> Vec<SaveRequest> {
        self.documents
            .iter()
            .filter(|d| d.dirty)
            .filter_map(|d| self.begin_save(d.id))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/documents.rs"]
mod tests;
