use crate::kernel::services::ports::WatcherSettings;
use crate::models::IgnoreRules;
use notify::event::{AccessKind, AccessMode, ModifyKind};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_SUPPRESS_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
    Other,
}

/// Coalesced "folder changed" hint. Carries the last raw event of the
/// burst; consumers re-list instead of treating it as a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderChange {
    pub kind: ChangeKind,
    pub filename: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    Change(FolderChange),
    Failed(String),
}

pub type ChangeSink = Arc<dyn Fn(FolderChange) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub debounce: Duration,
    pub suppress_window: Duration,
    pub ignore: IgnoreRules,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            suppress_window: DEFAULT_SUPPRESS_WINDOW,
            ignore: IgnoreRules::default(),
        }
    }
}

impl WatchConfig {
    pub fn from_settings(settings: &WatcherSettings) -> Self {
        Self {
            debounce: settings.debounce(),
            suppress_window: settings.suppress_window(),
            ignore: IgnoreRules::new(settings.ignored_names.iter().cloned()),
        }
    }
}

/// Drops notifications while the application's own writes settle.
/// Clears itself once the window elapses.
#[derive(Debug, Clone, Default)]
pub struct WriteSuppression {
    until: Arc<Mutex<Option<Instant>>>,
}

impl WriteSuppression {
    pub fn suppress(&self, window: Duration) {
        let next = Instant::now() + window;
        let mut until = self.until.lock().unwrap_or_else(|e| e.into_inner());
        *until = Some(match *until {
            Some(prev) if prev > next => prev,
            _ => next,
        });
    }

    pub fn is_active(&self) -> bool {
        let until = self.until.lock().unwrap_or_else(|e| e.into_inner());
        matches!(*until, Some(deadline) if Instant::now() < deadline)
    }
}

pub struct FolderWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
    task: tokio::task::JoinHandle<()>,
}

impl FolderWatcher {
    pub fn start(
        handle: &tokio::runtime::Handle,
        root: PathBuf,
        config: &WatchConfig,
        suppression: WriteSuppression,
        sink: ChangeSink,
    ) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let ignore = config.ignore.clone();
        let watched_root = root.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for signal in classify_event(event, &watched_root, &ignore) {
                        let _ = tx.send(signal);
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchSignal::Failed(e.to_string()));
                }
            },
            Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        let task = handle.spawn(debounce_changes(rx, config.debounce, suppression, sink));
        tracing::info!(root = %root.display(), "folder watch started");

        Ok(Self {
            root,
            _watcher: watcher,
            task,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(root = %self.root.display(), "folder watch stopped");
    }
}

/// Turns one raw notify event into zero or more signals. Ignored paths are
/// dropped here so they never touch the debounce timer.
pub fn classify_event(event: notify::Event, root: &Path, ignore: &IgnoreRules) -> Vec<WatchSignal> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Remove(_) => ChangeKind::Removed,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Renamed,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::Modified,
        EventKind::Access(_) => return Vec::new(),
        EventKind::Any | EventKind::Other => ChangeKind::Other,
    };

    if event.paths.is_empty() {
        return vec![WatchSignal::Change(FolderChange {
            kind,
            filename: None,
        })];
    }

    let mut signals = Vec::new();
    for path in event.paths {
        if kind == ChangeKind::Removed && path == root {
            signals.push(WatchSignal::Failed("watch target removed".to_string()));
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path);
        if ignore.is_ignored_path(relative) {
            continue;
        }
        signals.push(WatchSignal::Change(FolderChange {
            kind,
            filename: Some(relative.to_path_buf()),
        }));
    }
    signals
}

/// Emits one notification per burst, `debounce` after the last accepted
/// signal. A closed channel cancels a pending emission.
pub async fn debounce_changes(
    mut rx: mpsc::UnboundedReceiver<WatchSignal>,
    debounce: Duration,
    suppression: WriteSuppression,
    sink: ChangeSink,
) {
    let mut pending: Option<FolderChange> = None;
    loop {
        let signal = if pending.is_some() {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(signal) => signal,
                Err(_) => {
                    if let Some(change) = pending.take() {
                        if suppression.is_active() {
                            tracing::debug!(?change, "dropping folder change during self-write");
                        } else {
                            sink(change);
                        }
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match signal {
            Some(WatchSignal::Change(change)) => pending = Some(change),
            Some(WatchSignal::Failed(error)) => {
                tracing::error!(error = %error, "folder watch failed, subscription stopped");
                return;
            }
            None => return,
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/file_watcher.rs"]
mod tests;
