use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted record of one window's folder and tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub open_folder: Option<PathBuf>,
    #[serde(default)]
    pub tabs: Vec<SessionTab>,
    #[serde(default)]
    pub active_tab_path: Option<PathBuf>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.open_folder.is_none() && self.tabs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTab {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            x: None,
            y: None,
        }
    }
}

/// A tab that survived restore: disk content for saved files, the persisted
/// buffer for untitled ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredDocument {
    pub path: Option<PathBuf>,
    pub name: String,
    pub content: String,
}
