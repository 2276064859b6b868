use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub watcher: WatcherSettings,
    #[serde(default)]
    pub close: CloseSettings,
    #[serde(default = "default_true")]
    pub restore_session: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watcher: WatcherSettings::default(),
            close: CloseSettings::default(),
            restore_session: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_suppress_ms")]
    pub suppress_ms: u64,
    #[serde(default = "default_ignored_names")]
    pub ignored_names: Vec<String>,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            suppress_ms: default_suppress_ms(),
            ignored_names: default_ignored_names(),
        }
    }
}

impl WatcherSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn suppress_window(&self) -> Duration {
        Duration::from_millis(self.suppress_ms)
    }
}

/// Bounds on the unsaved-changes prompt when a window closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseSettings {
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    #[serde(default = "default_save_all_timeout_ms")]
    pub save_all_timeout_ms: u64,
}

impl Default for CloseSettings {
    fn default() -> Self {
        Self {
            response_timeout_ms: default_response_timeout_ms(),
            save_all_timeout_ms: default_save_all_timeout_ms(),
        }
    }
}

impl CloseSettings {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn save_all_timeout(&self) -> Duration {
        Duration::from_millis(self.save_all_timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

// Must exceed the debounce so a self-write's own notification lands inside it.
fn default_suppress_ms() -> u64 {
    500
}

fn default_ignored_names() -> Vec<String> {
    [".git", "node_modules", "__pycache__"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_response_timeout_ms() -> u64 {
    2_000
}

fn default_save_all_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
