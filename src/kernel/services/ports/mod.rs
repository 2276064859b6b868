//! Service ports: traits + data contracts.

pub mod dialog;
pub mod editor;
pub mod file;
pub mod settings;
pub mod window;

pub use dialog::{DialogProvider, HeadlessDialogs};
pub use editor::{EditorEngine, ModelId, ViewState};
pub use file::{DirEntry, FileError, Result as FileResult};
pub use settings::{CloseSettings, Settings, WatcherSettings};
pub use window::{WindowId, WindowKind};
