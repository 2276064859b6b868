use super::message::AppMessage;
use crate::kernel::documents::{DocumentId, SaveRequest};
use crate::kernel::explorer::RenderRequest;
use crate::kernel::services::adapters::file::{local, FileBroker};
use crate::kernel::services::adapters::file_watcher::ChangeSink;
use crate::kernel::services::adapters::git::git_status;
use crate::kernel::services::adapters::session_store::SessionStore;
use crate::kernel::services::ports::{DialogProvider, DirEntry, FileError, WindowId};
use crate::kernel::session::{RestoredDocument, SessionSnapshot, SessionTab};
use crate::kernel::DirListing;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

struct PersistRequest {
    snapshot: SessionSnapshot,
    done: Option<oneshot::Sender<()>>,
}

/// Executes one window's effects against the shared broker and reports
/// results as [`AppMessage`]s.
pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    window: WindowId,
    broker: Arc<FileBroker>,
    dialogs: Arc<dyn DialogProvider>,
    session_store: Option<SessionStore>,
    persist_tx: Option<mpsc::UnboundedSender<PersistRequest>>,
}

impl AsyncRuntime {
    pub fn new(
        tx: Sender<AppMessage>,
        window: WindowId,
        broker: Arc<FileBroker>,
        dialogs: Arc<dyn DialogProvider>,
        session_store: Option<SessionStore>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;

        let persist_tx = session_store.clone().map(|store| {
            let (persist_tx, persist_rx) = mpsc::unbounded_channel();
            runtime.spawn(run_persister(store, persist_rx));
            persist_tx
        });

        Ok(Self {
            runtime,
            tx,
            window,
            broker,
            dialogs,
            session_store,
            persist_tx,
        })
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn broker(&self) -> &Arc<FileBroker> {
        &self.broker
    }

    pub fn session_store(&self) -> Option<&SessionStore> {
        self.session_store.as_ref()
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn load_file(&self, path: PathBuf) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;
        self.runtime.spawn(async move {
            let resolved = match broker.resolve(window, &path).await {
                Ok(resolved) => resolved,
                Err(error) => {
                    let _ = tx.send(AppMessage::FileLoadFailed { path, error });
                    return;
                }
            };
            match broker.read(window, &resolved).await {
                Ok(content) => {
                    let _ = tx.send(AppMessage::FileLoaded {
                        path: resolved,
                        content,
                    });
                }
                Err(error) => {
                    let _ = tx.send(AppMessage::FileLoadFailed { path, error });
                }
            }
        });
    }

    /// Raises write suppression before touching the disk so the watcher
    /// ignores the echo of this write.
    pub fn write_file(&self, request: SaveRequest) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;
        self.runtime.spawn(async move {
            broker.suppress_watch(window);
            let result = broker.write(window, &request.path, &request.content).await;
            if let Err(e) = &result {
                tracing::error!(path = %request.path.display(), error = %e, "write failed");
            }
            let _ = tx.send(AppMessage::FileSaved { request, result });
        });
    }

    pub fn choose_save_path(
        &self,
        id: DocumentId,
        suggested_name: String,
        directory: Option<PathBuf>,
    ) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let dialogs = Arc::clone(&self.dialogs);
        let window = self.window;
        self.runtime.spawn(async move {
            let chosen = tokio::task::spawn_blocking(move || {
                dialogs.choose_save_path(&suggested_name, directory.as_deref())
            })
            .await
            .ok()
            .flatten();
            let message = match chosen {
                Some(path) => AppMessage::SavePathChosen {
                    id,
                    path: broker.grant(window, &path),
                },
                None => AppMessage::DialogCancelled,
            };
            let _ = tx.send(message);
        });
    }

    pub fn choose_open_file(&self, directory: Option<PathBuf>) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let dialogs = Arc::clone(&self.dialogs);
        let window = self.window;
        self.runtime.spawn(async move {
            let chosen =
                tokio::task::spawn_blocking(move || dialogs.choose_open_file(directory.as_deref()))
                    .await
                    .ok()
                    .flatten();
            let message = match chosen {
                Some(path) => AppMessage::OpenFileChosen(broker.grant(window, &path)),
                None => AppMessage::DialogCancelled,
            };
            let _ = tx.send(message);
        });
    }

    pub fn choose_open_folder(&self) {
        let tx = self.tx.clone();
        let dialogs = Arc::clone(&self.dialogs);
        self.runtime.spawn(async move {
            let chosen = tokio::task::spawn_blocking(move || dialogs.choose_open_folder())
                .await
                .ok()
                .flatten();
            let message = match chosen {
                Some(path) => AppMessage::OpenFolderChosen(path),
                None => AppMessage::DialogCancelled,
            };
            let _ = tx.send(message);
        });
    }

    /// Asks the user and waits at most `timeout`. `None` means no answer
    /// arrived in time; `Some(None)` means the prompt was dismissed.
    pub fn confirm(
        &self,
        message: String,
        options: &'static [&'static str],
        timeout: Duration,
    ) -> Option<Option<usize>> {
        let dialogs = Arc::clone(&self.dialogs);
        let task = self
            .runtime
            .spawn_blocking(move || dialogs.confirm(&message, options));
        self.runtime.block_on(async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(Ok(choice)) => Some(choice),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "confirm dialog task failed");
                    Some(None)
                }
                Err(_) => None,
            }
        })
    }

    /// Switches the broker root right away (dropping the old watch), then
    /// starts watching the new folder. `FolderOpened` is not sent when a
    /// later open replaced the root before the watch started.
    pub fn open_folder(&self, request: u64, path: PathBuf) {
        let root = match self.broker.open_folder(self.window, &path) {
            Ok(root) => root,
            Err(error) => {
                let _ = self.tx.send(AppMessage::FolderOpenFailed {
                    request,
                    path,
                    error,
                });
                return;
            }
        };
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;
        self.runtime.spawn(async move {
            if start_watch(&broker, window, &root, &tx).await {
                let _ = tx.send(AppMessage::FolderOpened { request, root });
            }
        });
    }

    pub fn close_folder(&self) {
        self.broker.close_folder(self.window);
    }

    pub fn render_tree(&self, request: RenderRequest) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;
        self.runtime.spawn(async move {
            let result = collect_listing(&broker, window, &request).await;
            let _ = tx.send(AppMessage::TreeRendered {
                generation: request.generation,
                result,
            });
        });
    }

    pub fn load_dir(&self, generation: u64, path: PathBuf) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;
        self.runtime.spawn(async move {
            let result = list_visible(&broker, window, &path).await;
            let _ = tx.send(AppMessage::DirLoaded {
                generation,
                path,
                result,
            });
        });
    }

    pub fn refresh_git(&self, generation: u64, root: PathBuf) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            match git_status(&root).await {
                Ok(statuses) => {
                    let _ = tx.send(AppMessage::GitStatus {
                        generation,
                        statuses,
                    });
                }
                Err(e) => {
                    tracing::debug!(root = %root.display(), error = %e, "git status unavailable");
                }
            }
        });
    }

    /// Reopens the recorded folder first, then reads every tab in order.
    pub fn restore_session(&self, request: u64, snapshot: SessionSnapshot) {
        let tx = self.tx.clone();
        let broker = Arc::clone(&self.broker);
        let window = self.window;

        let root = snapshot
            .open_folder
            .as_deref()
            .and_then(|folder| match broker.open_folder(window, folder) {
                Ok(root) => Some(root),
                Err(error) => {
                    tracing::warn!(path = %folder.display(), error = %error, "recorded folder unavailable");
                    let _ = tx.send(AppMessage::FolderOpenFailed {
                        request,
                        path: folder.to_path_buf(),
                        error,
                    });
                    None
                }
            });

        self.runtime.spawn(async move {
            if let Some(root) = root {
                if start_watch(&broker, window, &root, &tx).await {
                    let _ = tx.send(AppMessage::FolderOpened { request, root });
                }
            }

            let documents = restore_documents(&broker, window, snapshot.tabs).await;
            let active_path = match snapshot.active_tab_path {
                Some(path) => Some(local::canonicalize_lenient(&path).await.unwrap_or(path)),
                None => None,
            };
            let _ = tx.send(AppMessage::SessionRestored {
                documents,
                active_path,
            });
        });
    }

    pub fn persist_session(&self, snapshot: SessionSnapshot) {
        if let Some(persist_tx) = &self.persist_tx {
            let _ = persist_tx.send(PersistRequest {
                snapshot,
                done: None,
            });
        }
    }

    /// Queues `snapshot` behind any pending writes and waits until it is on
    /// disk, at most `timeout`.
    pub fn flush_session(&self, snapshot: SessionSnapshot, timeout: Duration) -> bool {
        let Some(persist_tx) = &self.persist_tx else {
            return false;
        };
        let (done_tx, done_rx) = oneshot::channel();
        let request = PersistRequest {
            snapshot,
            done: Some(done_tx),
        };
        if persist_tx.send(request).is_err() {
            return false;
        }
        self.runtime.block_on(async move {
            matches!(tokio::time::timeout(timeout, done_rx).await, Ok(Ok(())))
        })
    }
}

/// Returns false when `root` is no longer the window's folder. A watcher
/// that fails for any other reason leaves the folder open but unwatched.
async fn start_watch(
    broker: &FileBroker,
    window: WindowId,
    root: &Path,
    tx: &Sender<AppMessage>,
) -> bool {
    let sink_tx = tx.clone();
    let sink: ChangeSink = Arc::new(move |change| {
        let _ = sink_tx.send(AppMessage::FolderChanged(change));
    });
    match broker.watch(window, root, sink).await {
        Ok(_) => true,
        Err(e) if e.is_access_denied() => {
            tracing::debug!(window = %window, root = %root.display(), "folder replaced before watch started");
            false
        }
        Err(e) => {
            tracing::error!(window = %window, root = %root.display(), error = %e, "watch failed");
            true
        }
    }
}

async fn run_persister(store: SessionStore, mut rx: mpsc::UnboundedReceiver<PersistRequest>) {
    while let Some(first) = rx.recv().await {
        let mut latest = first.snapshot;
        let mut waiters: Vec<oneshot::Sender<()>> = first.done.into_iter().collect();
        while let Ok(next) = rx.try_recv() {
            latest = next.snapshot;
            waiters.extend(next.done);
        }

        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.save(&latest)).await {
            Ok(Ok(())) => tracing::debug!("session persisted"),
            Ok(Err(e)) => tracing::error!(error = %e, "session persist failed"),
            Err(e) => tracing::error!(error = %e, "session persist task failed"),
        }
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

async fn list_visible(
    broker: &FileBroker,
    window: WindowId,
    dir: &Path,
) -> Result<Vec<DirEntry>, FileError> {
    let ignore = broker.ignore_rules();
    let mut entries = broker.list(window, dir).await?;
    entries.retain(|e| !ignore.is_ignored_name(&e.name));
    Ok(entries)
}

/// Lists the root plus every expanded directory reachable through expanded
/// ancestors. Only a failure on the root fails the render.
pub async fn collect_listing(
    broker: &FileBroker,
    window: WindowId,
    request: &RenderRequest,
) -> Result<DirListing, FileError> {
    let expanded: FxHashSet<&Path> = request.expanded.iter().map(PathBuf::as_path).collect();
    let mut listing: DirListing = FxHashMap::default();
    let mut queue = VecDeque::from([request.root.clone()]);

    while let Some(dir) = queue.pop_front() {
        let entries = match list_visible(broker, window, &dir).await {
            Ok(entries) => entries,
            Err(error) if dir == request.root => return Err(error),
            Err(error) => {
                tracing::debug!(path = %dir.display(), error = %error, "skipping expanded directory");
                continue;
            }
        };
        queue.extend(
            entries
                .iter()
                .filter(|e| e.is_dir && expanded.contains(e.path.as_path()))
                .map(|e| e.path.clone()),
        );
        listing.insert(dir, entries);
    }
    Ok(listing)
}

/// Saved tabs are re-read from disk; untitled ones come back from the
/// recorded buffer. Tabs that fail to read are skipped.
pub async fn restore_documents(
    broker: &FileBroker,
    window: WindowId,
    tabs: Vec<SessionTab>,
) -> Vec<RestoredDocument> {
    let mut restored = Vec::with_capacity(tabs.len());
    for tab in tabs {
        match tab.path {
            None => restored.push(RestoredDocument {
                path: None,
                name: tab.name,
                content: tab.content,
            }),
            Some(path) => {
                let read = match broker.resolve(window, &path).await {
                    Ok(resolved) => broker
                        .read(window, &resolved)
                        .await
                        .map(|content| (resolved, content)),
                    Err(error) => Err(error),
                };
                match read {
                    Ok((resolved, content)) => restored.push(RestoredDocument {
                        path: Some(resolved),
                        name: tab.name,
                        content,
                    }),
                    Err(error) => {
                        tracing::warn!(path = %path.display(), error = %error, "skipping tab on restore");
                    }
                }
            }
        }
    }
    restored
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/runtime.rs"]
mod tests;
