//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod editor;
pub mod file;
pub mod file_watcher;
pub mod git;
pub mod runtime;
pub mod session_store;
pub mod settings;

pub use editor::RopeEngine;
pub use file::FileBroker;
pub use file_watcher::{ChangeKind, ChangeSink, FolderChange, FolderWatcher, WatchConfig};
pub use runtime::{AppMessage, AsyncRuntime};
pub use session_store::{ensure_log_dir, get_log_dir, SessionStore, SessionStoreError};
pub use settings::{ensure_settings_file, get_settings_path, load_settings};
