use std::path::{Path, PathBuf};

/// Native dialogs. Calls block until the user answers; callers run them off
/// the event loop.
pub trait DialogProvider: Send + Sync {
    fn choose_save_path(&self, suggested_name: &str, directory: Option<&Path>) -> Option<PathBuf>;

    fn choose_open_file(&self, directory: Option<&Path>) -> Option<PathBuf>;

    fn choose_open_folder(&self) -> Option<PathBuf>;

    /// Index of the chosen option, `None` when dismissed.
    fn confirm(&self, message: &str, options: &[&str]) -> Option<usize>;
}

/// Dialogs for headless runs: every prompt is dismissed.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessDialogs;

impl DialogProvider for HeadlessDialogs {
    fn choose_save_path(&self, _suggested_name: &str, _directory: Option<&Path>) -> Option<PathBuf> {
        None
    }

    fn choose_open_file(&self, _directory: Option<&Path>) -> Option<PathBuf> {
        None
    }

    fn choose_open_folder(&self) -> Option<PathBuf> {
        None
    }

    fn confirm(&self, _message: &str, _options: &[&str]) -> Option<usize> {
        None
    }
}
