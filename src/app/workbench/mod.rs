//! 工作台模块：单个窗口的状态、副作用执行与消息轮询

use crate::kernel::services::adapters::{
    AppMessage, AsyncRuntime, FileBroker, RopeEngine, SessionStore,
};
use crate::kernel::services::ports::{DialogProvider, Settings, WindowId, WindowKind};
use crate::kernel::{Action as KernelAction, AppState, DocumentId, Store};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod bridge;
mod close;
mod tick;

pub use close::{CloseDecision, CLOSE_OPTIONS};

const MAX_MESSAGES_PER_TICK: usize = 256;
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct Workbench {
    store: Store,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    settings: Settings,
}

impl Workbench {
    pub fn new(
        kind: WindowKind,
        broker: Arc<FileBroker>,
        dialogs: Arc<dyn DialogProvider>,
        settings: Settings,
        session_store: Option<SessionStore>,
    ) -> std::io::Result<Self> {
        let window = WindowId::next();
        let (tx, rx) = mpsc::channel();
        // 只有主窗口读写会话
        let session_store = session_store.filter(|_| kind == WindowKind::Primary);
        let runtime = AsyncRuntime::new(tx, window, broker, dialogs, session_store)?;
        let store = Store::new(AppState::new(window, kind), Box::new(RopeEngine::new()));

        tracing::info!(window = %window, kind = ?kind, "window opened");

        Ok(Self {
            store,
            runtime,
            rx,
            settings,
        })
    }

    pub fn window(&self) -> WindowId {
        self.store.state().window
    }

    pub fn kind(&self) -> WindowKind {
        self.store.state().kind
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn broker(&self) -> &Arc<FileBroker> {
        self.runtime.broker()
    }

    pub fn open_folder(&mut self, path: impl Into<PathBuf>) -> bool {
        self.dispatch(KernelAction::OpenFolder(path.into()))
    }

    pub fn close_folder(&mut self) -> bool {
        self.dispatch(KernelAction::CloseFolder)
    }

    pub fn open_file(&mut self, path: impl Into<PathBuf>) -> bool {
        self.dispatch(KernelAction::OpenFile(path.into()))
    }

    pub fn open_file_dialog(&mut self) -> bool {
        self.dispatch(KernelAction::OpenFileDialog)
    }

    pub fn open_folder_dialog(&mut self) -> bool {
        self.dispatch(KernelAction::OpenFolderDialog)
    }

    pub fn new_document(&mut self) -> bool {
        self.dispatch(KernelAction::NewDocument)
    }

    pub fn edit(&mut self, id: DocumentId, content: impl Into<String>) -> bool {
        self.dispatch(KernelAction::Edit {
            id,
            content: content.into(),
        })
    }

    pub fn activate(&mut self, id: DocumentId) -> bool {
        self.dispatch(KernelAction::Activate(id))
    }

    pub fn close_document(&mut self, id: DocumentId) -> bool {
        self.dispatch(KernelAction::Close(id))
    }

    pub fn save(&mut self, id: DocumentId) -> bool {
        self.dispatch(KernelAction::Save(id))
    }

    pub fn save_as(&mut self, id: DocumentId) -> bool {
        self.dispatch(KernelAction::SaveAs(id))
    }

    pub fn save_all(&mut self) -> bool {
        self.dispatch(KernelAction::SaveAll)
    }

    pub fn toggle_directory(&mut self, path: impl Into<PathBuf>) -> bool {
        self.dispatch(KernelAction::ToggleDirectory(path.into()))
    }

    pub fn refresh_tree(&mut self) -> bool {
        self.dispatch(KernelAction::RefreshTree)
    }

    /// Loads the persisted session and replays it. Secondary windows and a
    /// disabled `restore_session` setting start empty.
    pub fn restore_session(&mut self) -> bool {
        if !self.store.state().owns_session() || !self.settings.restore_session {
            return false;
        }
        let Some(store) = self.runtime.session_store() else {
            return false;
        };
        let snapshot = store.load();
        if snapshot.is_empty() {
            tracing::debug!(window = %self.window(), "no session to restore");
            return false;
        }
        tracing::info!(
            window = %self.window(),
            tabs = snapshot.tabs.len(),
            "restoring session"
        );
        self.dispatch(KernelAction::RestoreSession(snapshot))
    }

    /// Pumps messages until `done` holds or `timeout` passes.
    pub fn wait_until(&mut self, timeout: Duration, mut done: impl FnMut(&AppState) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            if done(self.store.state()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.rx.recv_timeout((deadline - now).min(WAIT_POLL_INTERVAL)) {
                Ok(msg) => {
                    self.handle_message(msg);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return done(self.store.state()),
            }
        }
    }

    /// Flushes the session for the owning window, waiting at most the
    /// save-all budget.
    pub fn shutdown(&mut self) -> bool {
        if !self.store.state().owns_session() {
            return false;
        }
        let snapshot = self.store.snapshot();
        let flushed = self
            .runtime
            .flush_session(snapshot, self.settings.close.save_all_timeout());
        if !flushed {
            tracing::warn!(window = %self.window(), "session flush did not complete");
        }
        flushed
    }
}

impl Drop for Workbench {
    fn drop(&mut self) {
        let window = self.window();
        self.runtime.broker().release(window);
        tracing::debug!(window = %window, "window released");
    }
}
