//! 文件代理：按窗口隔离的受控文件访问
//!
//! Every request is resolved to a canonical path and checked against the
//! caller's open folder before any I/O happens. State is keyed by
//! [`WindowId`], so windows never share a root, a grant set or a watch.

use super::local;
use crate::kernel::services::adapters::file_watcher::{
    ChangeSink, FolderWatcher, WatchConfig, WriteSuppression,
};
use crate::kernel::services::ports::file::{DirEntry, FileError, Result};
use crate::kernel::services::ports::WindowId;
use crate::models::IgnoreRules;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
struct BrokerContext {
    root: Option<PathBuf>,
    granted: FxHashSet<PathBuf>,
    watcher: Option<FolderWatcher>,
    suppression: WriteSuppression,
}

impl BrokerContext {
    fn permits(&self, resolved: &Path) -> bool {
        match &self.root {
            None => true,
            Some(root) => resolved.starts_with(root) || self.granted.contains(resolved),
        }
    }
}

pub struct FileBroker {
    contexts: Mutex<FxHashMap<WindowId, BrokerContext>>,
    watch_config: WatchConfig,
}

impl FileBroker {
    pub fn new(watch_config: WatchConfig) -> Self {
        Self {
            contexts: Mutex::new(FxHashMap::default()),
            watch_config,
        }
    }

    pub fn watch_config(&self) -> &WatchConfig {
        &self.watch_config
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.watch_config.ignore
    }

    fn with_context<R>(&self, window: WindowId, f: impl FnOnce(&mut BrokerContext) -> R) -> R {
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        f(contexts.entry(window).or_default())
    }

    /// Makes `path` the containment root for `window`. Any previous watch
    /// is cancelled first.
    pub fn open_folder(&self, window: WindowId, path: &Path) -> Result<PathBuf> {
        let root = path
            .canonicalize()
            .map_err(|e| FileError::from_io(path, e))?;
        if !root.is_dir() {
            return Err(FileError::Io {
                path: root,
                message: "not a directory".to_string(),
            });
        }

        let previous = self.with_context(window, |ctx| {
            ctx.root = Some(root.clone());
            ctx.watcher.take()
        });
        drop(previous);

        tracing::info!(window = %window, root = %root.display(), "folder opened");
        Ok(root)
    }

    pub fn close_folder(&self, window: WindowId) {
        let previous = self.with_context(window, |ctx| {
            ctx.root = None;
            ctx.watcher.take()
        });
        drop(previous);
    }

    pub fn root(&self, window: WindowId) -> Option<PathBuf> {
        self.with_context(window, |ctx| ctx.root.clone())
    }

    /// Permits a path the user picked in a dialog, even outside the root.
    pub fn grant(&self, window: WindowId, path: &Path) -> PathBuf {
        let resolved = local::canonicalize_lenient_sync(path);
        self.with_context(window, |ctx| {
            ctx.granted.insert(resolved.clone());
        });
        resolved
    }

    pub async fn resolve(&self, window: WindowId, path: &Path) -> Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            match self.root(window) {
                Some(root) => root.join(path),
                None => path.to_path_buf(),
            }
        };

        let resolved = local::canonicalize_lenient(&absolute).await?;
        if self.with_context(window, |ctx| ctx.permits(&resolved)) {
            Ok(resolved)
        } else {
            tracing::warn!(window = %window, path = %resolved.display(), "access denied");
            Err(FileError::AccessDenied(path.to_path_buf()))
        }
    }

    pub async fn read(&self, window: WindowId, path: &Path) -> Result<String> {
        let resolved = self.resolve(window, path).await?;
        local::read_text(&resolved).await
    }

    /// Overwrites unconditionally: the last write wins.
    pub async fn write(&self, window: WindowId, path: &Path, content: &str) -> Result<()> {
        let resolved = self.resolve(window, path).await?;
        local::write_text(&resolved, content).await
    }

    pub async fn list(&self, window: WindowId, path: &Path) -> Result<Vec<DirEntry>> {
        let resolved = self.resolve(window, path).await?;
        local::read_dir(&resolved).await
    }

    /// Starts a recursive watch on `path`, replacing the window's previous
    /// watch. Must run inside a tokio runtime.
    pub async fn watch(&self, window: WindowId, path: &Path, sink: ChangeSink) -> Result<PathBuf> {
        let resolved = self.resolve(window, path).await?;
        let suppression = self.with_context(window, |ctx| ctx.suppression.clone());
        let handle = tokio::runtime::Handle::current();
        let config = self.watch_config.clone();
        let watch_root = resolved.clone();
        // notify 的初始递归注册会阻塞，放到阻塞线程池
        let started = tokio::task::spawn_blocking(move || {
            FolderWatcher::start(&handle, watch_root, &config, suppression, sink)
        })
        .await
        .map_err(|e| FileError::Io {
            path: resolved.clone(),
            message: e.to_string(),
        })?;
        let watcher = started.map_err(|e| FileError::Io {
            path: resolved.clone(),
            message: e.to_string(),
        })?;

        // The root may have switched while the watcher was starting.
        let outcome = self.with_context(window, |ctx| {
            if ctx.permits(&resolved) {
                Ok(ctx.watcher.replace(watcher))
            } else {
                Err(watcher)
            }
        });
        match outcome {
            Ok(previous) => {
                drop(previous);
                Ok(resolved)
            }
            Err(stale) => {
                drop(stale);
                Err(FileError::AccessDenied(path.to_path_buf()))
            }
        }
    }

    /// Idempotent. Returns whether a watch was active.
    pub fn unwatch(&self, window: WindowId) -> bool {
        let previous = self.with_context(window, |ctx| ctx.watcher.take());
        previous.is_some()
    }

    pub fn watching(&self, window: WindowId) -> Option<PathBuf> {
        self.with_context(window, |ctx| {
            ctx.watcher
                .as_ref()
                .filter(|w| w.is_running())
                .map(|w| w.root().to_path_buf())
        })
    }

    /// Silences folder notifications for the configured window after a
    /// write issued by this application.
    pub fn suppress_watch(&self, window: WindowId) {
        let window_len = self.watch_config.suppress_window;
        self.with_context(window, |ctx| ctx.suppression.suppress(window_len));
    }

    pub fn is_suppressed(&self, window: WindowId) -> bool {
        self.with_context(window, |ctx| ctx.suppression.is_active())
    }

    /// Forgets everything about `window`, stopping its watch.
    pub fn release(&self, window: WindowId) {
        let removed = {
            let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
            contexts.remove(&window)
        };
        drop(removed);
    }
}

impl Default for FileBroker {
    fn default() -> Self {
        Self::new(WatchConfig::default())
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/file/broker.rs"]
mod tests;
